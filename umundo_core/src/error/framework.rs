//! uMundo 框架核心错误类型
//!
//! 定义所有框架级别的错误类型。

use super::context::ErrorContext;
use crate::transport::TransportError;
use std::io;
use thiserror::Error;

/// uMundo 框架核心错误类型
#[derive(Error, Debug)]
pub enum UmundoError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 传输错误
    #[error("传输错误: {0}")]
    Transport(#[from] TransportError),

    /// 序列化/反序列化错误
    #[error("序列化错误: {0}")]
    Serialization(String),

    /// 类型注册表错误
    #[error("类型注册错误: {0}")]
    Registry(String),

    /// 未知的消息类型
    #[error("未知的消息类型: {0}")]
    UnknownType(String),

    /// 超时错误
    #[error("操作超时")]
    Timeout,

    /// 验证错误
    #[error("验证失败: {0}")]
    Validation(String),

    /// 带上下文的错误
    #[error("{0} ({1})")]
    WithContext(#[source] Box<UmundoError>, ErrorContext),
}

impl UmundoError {
    /// 获取错误类型
    pub fn kind(&self) -> UmundoErrorKind {
        match self {
            UmundoError::Io(_) => UmundoErrorKind::Io,
            UmundoError::Config(_) => UmundoErrorKind::Config,
            UmundoError::Transport(_) => UmundoErrorKind::Transport,
            UmundoError::Serialization(_) => UmundoErrorKind::Serialization,
            UmundoError::Registry(_) => UmundoErrorKind::Registry,
            UmundoError::UnknownType(_) => UmundoErrorKind::UnknownType,
            UmundoError::Timeout => UmundoErrorKind::Timeout,
            UmundoError::Validation(_) => UmundoErrorKind::Validation,
            UmundoError::WithContext(inner, _) => inner.kind(),
        }
    }

    /// 添加上下文信息
    pub fn with_context<C>(self, context: C) -> Self
    where
        C: Into<ErrorContext>,
    {
        UmundoError::WithContext(Box::new(self), context.into())
    }

    /// 创建配置错误
    pub fn config(msg: impl Into<String>) -> Self {
        UmundoError::Config(msg.into())
    }

    /// 创建序列化错误
    pub fn serialization(msg: impl Into<String>) -> Self {
        UmundoError::Serialization(msg.into())
    }

    /// 创建类型注册错误
    pub fn registry(msg: impl Into<String>) -> Self {
        UmundoError::Registry(msg.into())
    }

    /// 创建未知类型错误
    pub fn unknown_type(tag: impl Into<String>) -> Self {
        UmundoError::UnknownType(tag.into())
    }

    /// 创建超时错误
    pub fn timeout() -> Self {
        UmundoError::Timeout
    }

    /// 创建验证错误
    pub fn validation(msg: impl Into<String>) -> Self {
        UmundoError::Validation(msg.into())
    }
}

/// 错误类型分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UmundoErrorKind {
    /// IO 错误
    Io,
    /// 配置错误
    Config,
    /// 传输错误
    Transport,
    /// 序列化错误
    Serialization,
    /// 类型注册错误
    Registry,
    /// 未知类型
    UnknownType,
    /// 超时错误
    Timeout,
    /// 验证错误
    Validation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = UmundoError::config("bad domain");
        assert!(matches!(err, UmundoError::Config(_)));
        assert_eq!(err.kind(), UmundoErrorKind::Config);
    }

    #[test]
    fn test_error_with_context_keeps_kind() {
        let err = UmundoError::unknown_type("AMessage")
            .with_context(ErrorContext::channel("fooChannel"));
        assert!(matches!(err, UmundoError::WithContext(_, _)));
        assert_eq!(err.kind(), UmundoErrorKind::UnknownType);
        assert_eq!(err.to_string(), "未知的消息类型: AMessage (频道: fooChannel)");
    }

    #[test]
    fn test_error_from_transport() {
        let err: UmundoError = TransportError::Closed("fooChannel".to_string()).into();
        assert_eq!(err.kind(), UmundoErrorKind::Transport);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(UmundoError::registry("").kind(), UmundoErrorKind::Registry);
        assert_eq!(UmundoError::serialization("").kind(), UmundoErrorKind::Serialization);
        assert_eq!(UmundoError::timeout().kind(), UmundoErrorKind::Timeout);
    }
}
