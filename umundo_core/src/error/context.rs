//! 错误上下文
//!
//! 为错误附加频道、类型标签等额外信息。

use std::fmt;

/// 错误上下文信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    /// 出错的频道
    Channel(String),
    /// 出错消息的类型标签
    TypeTag(String),
    /// 键值对上下文
    KeyValue(String, String),
    /// 自定义上下文
    Custom(String),
}

impl ErrorContext {
    /// 频道上下文
    pub fn channel(name: impl Into<String>) -> Self {
        ErrorContext::Channel(name.into())
    }

    /// 类型标签上下文
    pub fn type_tag(tag: impl Into<String>) -> Self {
        ErrorContext::TypeTag(tag.into())
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorContext::Channel(name) => write!(f, "频道: {}", name),
            ErrorContext::TypeTag(tag) => write!(f, "类型: {}", tag),
            ErrorContext::KeyValue(key, value) => write!(f, "{}: {}", key, value),
            ErrorContext::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<(&str, String)> for ErrorContext {
    fn from((key, value): (&str, String)) -> Self {
        ErrorContext::KeyValue(key.to_string(), value)
    }
}

impl From<(&str, &str)> for ErrorContext {
    fn from((key, value): (&str, &str)) -> Self {
        ErrorContext::KeyValue(key.to_string(), value.to_string())
    }
}

impl From<String> for ErrorContext {
    fn from(msg: String) -> Self {
        ErrorContext::Custom(msg)
    }
}

impl From<&str> for ErrorContext {
    fn from(msg: &str) -> Self {
        ErrorContext::Custom(msg.to_string())
    }
}
