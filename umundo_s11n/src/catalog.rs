//! 类型目录
//!
//! 启动时填充的一组已知类型。订阅者遇到未注册的标签且开启了自动注册时，
//! 从目录中按名称查找。

use crate::codec::TypedMessage;
use crate::descriptor::TypeDescriptor;
use std::collections::HashMap;

/// 类型目录
pub struct TypeCatalog<M> {
    entries: HashMap<String, TypeDescriptor<M>>,
}

impl<M: 'static> TypeCatalog<M> {
    /// 创建空目录
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// 以类型名加入类型
    pub fn with<T>(mut self) -> Self
    where
        T: TypedMessage + Into<M>,
    {
        self.add(TypeDescriptor::of::<T>());
        self
    }

    /// 以描述符的类型名加入描述符，同名条目被替换
    pub fn add(&mut self, descriptor: TypeDescriptor<M>) {
        self.entries
            .insert(descriptor.type_name().to_string(), descriptor);
    }

    /// 查找标签
    ///
    /// 先精确匹配，再匹配限定名的最后一段（`pkg.Type`、`a::b::Type`）。
    pub fn lookup(&self, tag: &str) -> Option<TypeDescriptor<M>> {
        if let Some(descriptor) = self.entries.get(tag) {
            return Some(descriptor.clone());
        }

        let short = tag.rsplit(['.', ':']).next()?;
        if short.is_empty() || short == tag {
            return None;
        }
        self.entries.get(short).cloned()
    }

    /// 目录中的类型名，已排序
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M: 'static> Default for TypeCatalog<M> {
    fn default() -> Self {
        Self::new()
    }
}
