//! uMundo 核心类型
//!
//! 提供消息信封、端点标识、统一错误和原始传输接口。

pub mod error;
pub mod message;
pub mod peer;
pub mod transport;

// 导出主要类型到 crate root
pub use crate::error::{ErrorContext, Result, UmundoError, UmundoErrorKind};
pub use crate::message::{Message, TYPE_META_KEY};
pub use crate::peer::{PeerId, PeerIdGenerator};
pub use crate::transport::{
    Greeter, RawPublisher, RawSubscription, Receiver, Transport, TransportError,
};

// 预导出
pub mod prelude {
    pub use crate::error::{ErrorContext, Result, UmundoError, UmundoErrorKind};
    pub use crate::message::{Message, TYPE_META_KEY};
    pub use crate::peer::PeerId;
    pub use crate::transport::{Greeter, RawPublisher, RawSubscription, Receiver, Transport};
}
