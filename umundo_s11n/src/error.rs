//! 类型化层错误

use thiserror::Error;
use umundo_core::{ErrorContext, TransportError, UmundoError};

/// 编解码错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// 编码失败
    #[error("编码失败: {0}")]
    Encode(String),

    /// 解码失败（字节损坏、截断或结构不匹配）
    #[error("解码失败: {0}")]
    Decode(String),
}

/// 类型化发布/订阅错误
#[derive(Error, Debug)]
pub enum S11nError {
    /// 类型标签未注册且无法从目录解析
    #[error("未知的消息类型: {0}")]
    UnknownType(String),

    /// 消息缺少类型标签
    #[error("消息缺少类型标签 (um.s11n.type)")]
    MissingTypeTag,

    /// 负载无法按标签对应的类型解码
    #[error("解码 {tag} 失败: {source}")]
    Decode {
        tag: String,
        #[source]
        source: CodecError,
    },

    /// 对象编码失败
    #[error("编码 {tag} 失败: {source}")]
    Encode {
        tag: String,
        #[source]
        source: CodecError,
    },

    /// 标签已注册且策略为拒绝
    #[error("类型标签已注册: {0}")]
    DuplicateRegistration(String),

    /// 空的类型标签
    #[error("类型标签不能为空")]
    EmptyTypeTag,

    /// 注册表内部错误
    #[error("注册表错误: {0}")]
    Registry(String),

    /// 传输错误
    #[error("传输错误: {0}")]
    Transport(#[from] TransportError),
}

/// 类型化层 Result 类型
pub type Result<T> = std::result::Result<T, S11nError>;

impl From<S11nError> for UmundoError {
    fn from(err: S11nError) -> Self {
        match err {
            S11nError::UnknownType(tag) => UmundoError::UnknownType(tag),
            S11nError::Transport(e) => UmundoError::Transport(e),
            S11nError::MissingTypeTag => {
                UmundoError::serialization(S11nError::MissingTypeTag.to_string())
            }
            S11nError::Decode { tag, source } | S11nError::Encode { tag, source } => {
                UmundoError::serialization(source.to_string())
                    .with_context(ErrorContext::type_tag(tag))
            }
            e @ (S11nError::DuplicateRegistration(_)
            | S11nError::EmptyTypeTag
            | S11nError::Registry(_)) => UmundoError::Registry(e.to_string()),
        }
    }
}
