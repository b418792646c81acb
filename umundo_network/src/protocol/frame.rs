//! 消息帧
//!
//! 定义 [`Message`] 的二进制线路格式。

use bytes::{Buf, BufMut, BytesMut};
use std::collections::BTreeMap;
use std::fmt;
use umundo_core::Message;

/// 消息帧
///
/// 采用 Length-Prefix-Message 格式，所有整数为小端序
///
/// ```text
/// +--------+-------+----------------------------------------+----------+
/// | Length | Count |  Meta * Count                          | Payload  |
/// | 4 bytes|2 bytes| key_len(2) key val_len(4) val          | variable |
/// +--------+-------+----------------------------------------+----------+
/// ```
///
/// 负载按原始字节写入，不做任何字符转换。
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFrame;

impl MessageFrame {
    /// 长度前缀大小
    pub const LENGTH_SIZE: usize = 4;

    /// 元数据条目数字段大小
    pub const COUNT_SIZE: usize = 2;

    /// 元数据总量上限（1MB）
    pub const MAX_META_SIZE: usize = 1024 * 1024;

    /// 帧内容上限（不含长度前缀）
    pub const MAX_FRAME_SIZE: usize = umundo_config::MAX_PAYLOAD_LIMIT + Self::MAX_META_SIZE;

    /// 计算帧内容大小（不包含长度前缀）
    pub fn body_len(msg: &Message) -> Result<usize, FrameError> {
        let count = msg.meta().len();
        if count > u16::MAX as usize {
            return Err(FrameError::TooManyMeta(count));
        }

        let mut meta_len = 0usize;
        for (key, value) in msg.meta() {
            if key.len() > u16::MAX as usize {
                return Err(FrameError::KeyTooLong(key.len()));
            }
            meta_len += 2 + key.len() + 4 + value.len();
        }
        if meta_len > Self::MAX_META_SIZE {
            return Err(FrameError::FrameTooLarge(meta_len));
        }

        let body_len = Self::COUNT_SIZE + meta_len + msg.size();
        if body_len > Self::MAX_FRAME_SIZE {
            return Err(FrameError::FrameTooLarge(body_len));
        }
        Ok(body_len)
    }

    /// 编码为独立的字节缓冲
    pub fn encode(msg: &Message) -> Result<BytesMut, FrameError> {
        let mut buf = BytesMut::new();
        Self::encode_into(msg, &mut buf)?;
        Ok(buf)
    }

    /// 追加编码到缓冲区
    pub fn encode_into(msg: &Message, dst: &mut BytesMut) -> Result<(), FrameError> {
        let body_len = Self::body_len(msg)?;
        dst.reserve(Self::LENGTH_SIZE + body_len);

        dst.put_u32_le(body_len as u32);
        dst.put_u16_le(msg.meta().len() as u16);
        for (key, value) in msg.meta() {
            dst.put_u16_le(key.len() as u16);
            dst.put_slice(key.as_bytes());
            dst.put_u32_le(value.len() as u32);
            dst.put_slice(value.as_bytes());
        }
        dst.put_slice(msg.data());

        Ok(())
    }

    /// 从字节流解码一帧
    ///
    /// 数据不完整时返回 `Ok(None)` 且不消耗缓冲区。
    pub fn decode(buf: &mut BytesMut) -> Result<Option<Message>, FrameError> {
        if buf.len() < Self::LENGTH_SIZE {
            return Ok(None);
        }

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&buf[..Self::LENGTH_SIZE]);
        let body_len = u32::from_le_bytes(len_bytes) as usize;

        if body_len > Self::MAX_FRAME_SIZE {
            return Err(FrameError::FrameTooLarge(body_len));
        }

        if buf.len() < Self::LENGTH_SIZE + body_len {
            buf.reserve(Self::LENGTH_SIZE + body_len - buf.len());
            return Ok(None);
        }

        buf.advance(Self::LENGTH_SIZE);
        let mut body = buf.split_to(body_len);

        if body.remaining() < Self::COUNT_SIZE {
            return Err(FrameError::Truncated("count"));
        }
        let count = body.get_u16_le();

        let mut meta = BTreeMap::new();
        for _ in 0..count {
            let key = read_string(&mut body, 2, "key")?;
            let value = read_string(&mut body, 4, "value")?;
            meta.insert(key, value);
        }

        Ok(Some(Message::from_parts(body.freeze(), meta)))
    }
}

fn read_string(body: &mut BytesMut, width: usize, field: &'static str) -> Result<String, FrameError> {
    if body.remaining() < width {
        return Err(FrameError::Truncated(field));
    }
    let len = match width {
        2 => body.get_u16_le() as usize,
        _ => body.get_u32_le() as usize,
    };
    if body.remaining() < len {
        return Err(FrameError::Truncated(field));
    }

    let raw = body.split_to(len);
    String::from_utf8(raw.to_vec()).map_err(|_| FrameError::InvalidUtf8(field))
}

/// 帧错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// 帧过大
    FrameTooLarge(usize),
    /// 元数据条目过多
    TooManyMeta(usize),
    /// 元数据键过长
    KeyTooLong(usize),
    /// 帧内字段被截断
    Truncated(&'static str),
    /// 元数据不是有效的 UTF-8
    InvalidUtf8(&'static str),
    /// IO 错误
    Io(String),
}

impl From<std::io::Error> for FrameError {
    fn from(err: std::io::Error) -> Self {
        FrameError::Io(err.to_string())
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameTooLarge(size) => write!(f, "帧过大: {} 字节", size),
            Self::TooManyMeta(count) => write!(f, "元数据条目过多: {}", count),
            Self::KeyTooLong(len) => write!(f, "元数据键过长: {} 字节", len),
            Self::Truncated(field) => write!(f, "帧字段被截断: {}", field),
            Self::InvalidUtf8(field) => write!(f, "元数据不是有效的 UTF-8: {}", field),
            Self::Io(msg) => write!(f, "IO 错误: {}", msg),
        }
    }
}

impl std::error::Error for FrameError {}
