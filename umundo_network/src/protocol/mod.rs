//! 协议模块
//!
//! 消息帧格式和流式编解码。

pub mod codec;
pub mod frame;

// 重新导出主要类型
pub use codec::MessageCodec;
pub use frame::{FrameError, MessageFrame};
