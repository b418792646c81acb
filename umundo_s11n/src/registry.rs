//! 类型注册表
//!
//! 管理类型标签到类型描述符的映射，供订阅者在收到消息时查找解码例程。
//! 注册可以在任何时候进行，与消息分发并发。

use crate::catalog::TypeCatalog;
use crate::codec::TypedMessage;
use crate::descriptor::TypeDescriptor;
use crate::error::{Result, S11nError};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use umundo_config::{DuplicatePolicy, S11nConfig};

/// 类型注册表
///
/// 单写多读。查找只在锁内复制描述符，解码在锁外进行。锁中毒时所有操作
/// 都返回 [`S11nError::Registry`]。
pub struct TypeRegistry<M> {
    types: RwLock<HashMap<String, TypeDescriptor<M>>>,
    policy: DuplicatePolicy,
    catalog: Option<Arc<TypeCatalog<M>>>,
    auto_register: AtomicBool,
}

impl<M: 'static> TypeRegistry<M> {
    /// 创建新的注册表，重复注册时覆盖
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }

    /// 使用指定的重复注册策略创建注册表
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
            policy,
            catalog: None,
            auto_register: AtomicBool::new(false),
        }
    }

    /// 按配置创建注册表
    pub fn from_config(config: &S11nConfig) -> Self {
        let registry = Self::with_policy(config.duplicate_policy);
        registry.set_auto_register(config.auto_register_types);
        registry
    }

    /// 附加类型目录
    pub fn with_catalog(mut self, catalog: Arc<TypeCatalog<M>>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, TypeDescriptor<M>>>> {
        self.types
            .read()
            .map_err(|e| S11nError::Registry(format!("获取读锁失败: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, TypeDescriptor<M>>>> {
        self.types
            .write()
            .map_err(|e| S11nError::Registry(format!("获取写锁失败: {}", e)))
    }

    /// 注册类型标签
    ///
    /// 覆盖策略下返回被替换的描述符；拒绝策略下重复注册返回
    /// [`S11nError::DuplicateRegistration`]，原有条目不变。
    pub fn register(
        &self,
        tag: impl Into<String>,
        descriptor: TypeDescriptor<M>,
    ) -> Result<Option<TypeDescriptor<M>>> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(S11nError::EmptyTypeTag);
        }

        let mut types = self.write()?;
        match types.entry(tag) {
            Entry::Occupied(mut entry) => match self.policy {
                DuplicatePolicy::Overwrite => {
                    debug!(tag = %entry.key(), "覆盖已注册的类型");
                    Ok(Some(entry.insert(descriptor)))
                }
                DuplicatePolicy::Reject => {
                    Err(S11nError::DuplicateRegistration(entry.key().clone()))
                }
            },
            Entry::Vacant(entry) => {
                debug!(tag = %entry.key(), type_name = descriptor.type_name(), "注册类型");
                entry.insert(descriptor);
                Ok(None)
            }
        }
    }

    /// 以类型名注册类型
    pub fn register_type<T>(&self) -> Result<Option<TypeDescriptor<M>>>
    where
        T: TypedMessage + Into<M>,
    {
        self.register(T::type_name(), TypeDescriptor::of::<T>())
    }

    /// 解析类型标签
    ///
    /// 未注册且开启了自动注册时从目录查找，命中后以目录中的类型名写入注册表，
    /// 同一类型的不同限定写法（`a.AMessage`、`b.AMessage`）共用一个条目。
    /// 以该类型名显式注册的描述符优先。
    pub fn resolve(&self, tag: &str) -> Result<TypeDescriptor<M>> {
        if let Some(descriptor) = self.read()?.get(tag) {
            return Ok(descriptor.clone());
        }

        if !self.auto_register() {
            return Err(S11nError::UnknownType(tag.to_string()));
        }
        let Some(found) = self.catalog.as_ref().and_then(|c| c.lookup(tag)) else {
            return Err(S11nError::UnknownType(tag.to_string()));
        };

        if let Some(descriptor) = self.read()?.get(found.type_name()) {
            return Ok(descriptor.clone());
        }
        let cached = self
            .write()?
            .entry(found.type_name().to_string())
            .or_insert(found)
            .clone();
        debug!(tag, type_name = cached.type_name(), "从类型目录自动注册");
        Ok(cached)
    }

    /// 取消注册
    pub fn unregister(&self, tag: &str) -> Result<Option<TypeDescriptor<M>>> {
        Ok(self.write()?.remove(tag))
    }

    /// 是否已注册
    pub fn contains(&self, tag: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(tag))
    }

    /// 已注册数量
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// 全部已注册标签，已排序
    pub fn tags(&self) -> Result<Vec<String>> {
        let mut tags: Vec<String> = self.read()?.keys().cloned().collect();
        tags.sort();
        Ok(tags)
    }

    /// 开启或关闭从目录自动注册
    pub fn set_auto_register(&self, enabled: bool) {
        self.auto_register.store(enabled, Ordering::Relaxed);
    }

    pub fn auto_register(&self) -> bool {
        self.auto_register.load(Ordering::Relaxed)
    }

    /// 重复注册策略
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// 附加的类型目录
    pub fn catalog(&self) -> Option<&Arc<TypeCatalog<M>>> {
        self.catalog.as_ref()
    }
}

impl<M: 'static> Default for TypeRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}
