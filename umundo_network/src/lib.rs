//! uMundo 传输实现
//!
//! 提供原始发布/订阅接口的进程内实现，以及消息的二进制帧格式。

pub mod loopback;
pub mod protocol;

// 导出主要类型到 crate root
pub use crate::loopback::{
    LoopbackPublisher, LoopbackSubscription, LoopbackTransport, TransportMetrics,
};
pub use crate::protocol::{FrameError, MessageCodec, MessageFrame};

// 预导出
pub mod prelude {
    pub use crate::loopback::LoopbackTransport;
    pub use crate::protocol::MessageCodec;
    pub use umundo_core::{Message, RawPublisher, RawSubscription, Transport};
}
