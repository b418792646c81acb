//! 消息信封
//!
//! 一条消息由二进制负载和字符串元数据组成。负载始终按原始字节处理，
//! 不经过任何字符编码。

use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;

/// 类型化层写入的类型标签元数据键
pub const TYPE_META_KEY: &str = "um.s11n.type";

/// 消息
///
/// 发送端创建并在交给传输层前独占；接收端回调只拿到借用，
/// 需要保留时必须显式 `clone()`。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// 负载
    data: Bytes,
    /// 元数据
    meta: BTreeMap<String, String>,
}

impl Message {
    /// 创建空消息
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用负载创建消息
    pub fn with_data(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            meta: BTreeMap::new(),
        }
    }

    /// 由负载和元数据组装消息
    pub fn from_parts(data: Bytes, meta: BTreeMap<String, String>) -> Self {
        Self { data, meta }
    }

    /// 拆分为负载和元数据
    pub fn into_parts(self) -> (Bytes, BTreeMap<String, String>) {
        (self.data, self.meta)
    }

    /// 负载
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// 负载字节数
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 替换负载
    pub fn set_data(&mut self, data: impl Into<Bytes>) {
        self.data = data.into();
    }

    /// 写入元数据，已存在的键会被覆盖
    pub fn put_meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.meta.insert(key.into(), value.into());
    }

    /// 读取元数据
    pub fn get_meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// 移除元数据
    pub fn remove_meta(&mut self, key: &str) -> Option<String> {
        self.meta.remove(key)
    }

    /// 全部元数据
    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    /// 类型标签（`um.s11n.type`）
    pub fn type_tag(&self) -> Option<&str> {
        self.get_meta(TYPE_META_KEY)
    }

    /// 设置类型标签
    pub fn set_type_tag(&mut self, tag: impl Into<String>) {
        self.put_meta(TYPE_META_KEY, tag);
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Message[type={}, size={}, meta={}]",
            self.type_tag().unwrap_or("-"),
            self.data.len(),
            self.meta.len()
        )
    }
}
