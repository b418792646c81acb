//! # uMundo - 基于频道的类型化发布/订阅中间件
//!
//! uMundo 在原始发布/订阅通道之上提供类型化的对象收发。发送端把对象编码为
//! 负载并写入类型标签，接收端按标签查找解码例程，把对象交给应用回调。
//!
//! ## 特性
//!
//! - 频道前缀匹配的发布/订阅
//! - Protobuf（prost）和 Bincode（serde）两种负载格式
//! - 每个订阅者独立的类型注册表，可选的类型目录回退
//! - 订阅者加入/离开通知
//! - 基于 Tokio 的进程内传输
//!
//! ## 快速开始
//!
//! ```rust,no_run,ignore
//! use umundo::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> umundo::Result<()> {
//!     let node = Node::new();
//!
//!     let sub = node.subscriber("fooChannel", |msg: Inbound, meta: &Message| {
//!         println!("Received {:?} tagged {:?}", msg, meta.type_tag());
//!     })?;
//!     sub.register::<AMessage>()?;
//!
//!     let publisher = node.publisher("fooChannel")?;
//!     publisher.send_object(&AMessage { a: 42, b: 43 }).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## 模块组织
//!
//! ### 配置模块
//! - UmundoConfig - 传输层和序列化层配置
//!
//! ### 核心模块
//! - Message - 负载和元数据
//! - Transport / RawPublisher / RawSubscription - 原始传输接口
//!
//! ### 传输模块
//! - LoopbackTransport - 进程内传输
//! - MessageCodec - 消息帧编解码
//!
//! ### 类型化模块
//! - TypedPublisher / TypedSubscriber - 类型化端点
//! - TypeRegistry / TypeCatalog - 类型注册表和类型目录

// ============================================================================
// Conditional Compilation Based on Features
// ============================================================================

// Node API
#[cfg(feature = "loopback")]
pub mod node;

#[cfg(feature = "loopback")]
pub use crate::node::{Node, NodeBuilder};

// ============================================================================
// Crate Re-exports (for advanced users)
// ============================================================================

pub use umundo_config;

pub use umundo_core;

pub use umundo_s11n;

#[cfg(feature = "loopback")]
pub use umundo_network;

pub use umundo_core::{Message, PeerId};
pub use umundo_s11n::{
    BincodeCodec, ProtobufCodec, TypeCatalog, TypeDescriptor, TypedGreeter, TypedMessage,
    TypedPublisher, TypedReceiver, TypedSubscriber,
};

// ============================================================================
// Prelude Module
// ============================================================================

/// 预导出常用类型
///
/// 通过 `use umundo::prelude::*;` 导入所有常用类型
pub mod prelude {
    pub use umundo_config::{DuplicatePolicy, UmundoConfig};

    pub use umundo_core::{Message, PeerId};

    pub use umundo_s11n::prelude::*;
    pub use umundo_s11n::TypeCatalog;

    #[cfg(feature = "loopback")]
    pub use crate::node::{Node, NodeBuilder};

    pub use crate::{Error, Result};
}

// ============================================================================
// Error Types
// ============================================================================

/// uMundo 统一 Result 类型
pub type Result<T> = std::result::Result<T, Error>;

/// uMundo 统一错误枚举
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 核心错误
    #[error(transparent)]
    Core(#[from] umundo_core::UmundoError),

    /// 类型化层错误
    #[error(transparent)]
    S11n(#[from] umundo_s11n::S11nError),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] umundo_config::ConfigError),

    /// 传输错误
    #[error(transparent)]
    Transport(#[from] umundo_core::TransportError),

    /// IO 错误
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// 自定义错误
    #[error("{0}")]
    Custom(String),
}

impl From<Error> for umundo_core::UmundoError {
    fn from(err: Error) -> Self {
        use umundo_core::UmundoError;

        match err {
            Error::Core(err) => err,
            Error::S11n(err) => err.into(),
            Error::Config(err) => UmundoError::config(err.to_string()),
            Error::Transport(err) => UmundoError::Transport(err),
            Error::Io(err) => UmundoError::Io(err),
            Error::Custom(msg) => UmundoError::validation(msg),
        }
    }
}

// ============================================================================
// Version Information
// ============================================================================

/// uMundo 版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// uMundo 包名
pub const NAME: &str = env!("CARGO_PKG_NAME");
