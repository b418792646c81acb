//! 消息编解码器
//!
//! 基于 [`MessageFrame`] 的流式编解码，可直接用于 `tokio_util::codec::Framed`。

use crate::protocol::frame::{FrameError, MessageFrame};
use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use umundo_core::Message;

/// 消息编解码器
///
/// 无状态，同时实现编码和解码。`max_payload_size` 在编码端和解码端
/// 都会检查。
#[derive(Debug, Clone)]
pub struct MessageCodec {
    max_payload_size: usize,
}

impl MessageCodec {
    /// 创建新的编解码器，使用帧格式允许的最大负载
    pub fn new() -> Self {
        Self {
            max_payload_size: umundo_config::MAX_PAYLOAD_LIMIT,
        }
    }

    /// 限制单条消息的负载大小
    pub fn with_max_payload_size(max_payload_size: usize) -> Self {
        Self { max_payload_size }
    }

    /// 负载上限
    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    fn check_payload(&self, msg: &Message) -> Result<(), FrameError> {
        if msg.size() > self.max_payload_size {
            return Err(FrameError::FrameTooLarge(msg.size()));
        }
        Ok(())
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        <Self as Encoder<&Message>>::encode(self, &item, dst)
    }
}

impl Encoder<&Message> for MessageCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.check_payload(item)?;
        MessageFrame::encode_into(item, dst)
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match MessageFrame::decode(src)? {
            Some(msg) => {
                self.check_payload(&msg)?;
                Ok(Some(msg))
            }
            None => Ok(None),
        }
    }
}
