//! 负载编解码
//!
//! 支持两种负载格式：
//! - Protobuf：基于模式、可扩展，适用于任意 `prost::Message`
//! - Bincode：serde 二进制格式，适用于任意 `Serialize + Deserialize` 类型
//!
//! 负载始终是原始字节，编码结果不经过任何字符转换。

use crate::error::CodecError;
use bincode::Options;
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// 负载格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// Protobuf
    Protobuf,
    /// Bincode
    Bincode,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadKind::Protobuf => write!(f, "protobuf"),
            PayloadKind::Bincode => write!(f, "bincode"),
        }
    }
}

/// 编解码器
///
/// 对所有受支持的 `value` 满足 `decode(encode(value)) == value`。
pub trait Codec<T> {
    /// 负载格式
    const KIND: PayloadKind;

    /// 编码对象
    fn encode(value: &T) -> Result<Bytes, CodecError>;

    /// 从字节解码对象
    fn decode(data: &[u8]) -> Result<T, CodecError>;
}

/// Protobuf 编解码器
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufCodec;

impl<T> Codec<T> for ProtobufCodec
where
    T: prost::Message + Default,
{
    const KIND: PayloadKind = PayloadKind::Protobuf;

    fn encode(value: &T) -> Result<Bytes, CodecError> {
        let mut buf = Vec::with_capacity(value.encoded_len());
        value
            .encode(&mut buf)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(Bytes::from(buf))
    }

    fn decode(data: &[u8]) -> Result<T, CodecError> {
        T::decode(data).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// Bincode 编解码器
///
/// 使用定长整数编码，解码时拒绝多余的尾随字节。
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_limit(umundo_config::MAX_PAYLOAD_LIMIT as u64)
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

impl<T> Codec<T> for BincodeCodec
where
    T: Serialize + DeserializeOwned,
{
    const KIND: PayloadKind = PayloadKind::Bincode;

    fn encode(value: &T) -> Result<Bytes, CodecError> {
        bincode_options()
            .serialize(value)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(data: &[u8]) -> Result<T, CodecError> {
        bincode_options()
            .deserialize(data)
            .map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// 类型化消息
///
/// 把一个类型绑定到它的编解码器和静态类型名。类型名就是发送时写入
/// `um.s11n.type` 的默认标签。
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use umundo_s11n::{BincodeCodec, TypedMessage};
///
/// #[derive(Serialize, Deserialize)]
/// struct AMessage {
///     a: i32,
///     b: i32,
/// }
///
/// impl TypedMessage for AMessage {
///     type Codec = BincodeCodec;
/// }
///
/// assert_eq!(AMessage::type_name(), "AMessage");
/// ```
pub trait TypedMessage: Sized + 'static {
    /// 编解码器
    type Codec: Codec<Self>;

    /// 静态类型名，默认为不带路径和泛型参数的 Rust 类型名
    ///
    /// 默认值取自 [`std::any::type_name`]，其输出格式不保证跨编译器版本
    /// 稳定，而且泛型参数被去掉后 `Wrapper<u8>` 与 `Wrapper<u16>` 得到同一个
    /// 名字。跨进程通信的类型和泛型类型应覆盖此方法，返回固定的名字。
    fn type_name() -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// 去掉路径和泛型参数的类型名
pub fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// 按类型绑定的编解码器编码
pub fn encode_object<T: TypedMessage>(value: &T) -> Result<Bytes, CodecError> {
    <T::Codec as Codec<T>>::encode(value)
}

/// 按类型绑定的编解码器解码
pub fn decode_object<T: TypedMessage>(data: &[u8]) -> Result<T, CodecError> {
    <T::Codec as Codec<T>>::decode(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, PartialEq, prost::Message)]
    struct ChatMessage {
        #[prost(string, tag = "1")]
        content: String,
        #[prost(bytes = "vec", tag = "2")]
        blob: Vec<u8>,
    }

    impl TypedMessage for ChatMessage {
        type Codec = ProtobufCodec;
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct AMessage {
        a: i32,
        b: i32,
    }

    impl TypedMessage for AMessage {
        type Codec = BincodeCodec;
    }

    mod nested {
        #[derive(serde::Serialize, serde::Deserialize)]
        pub struct Wrapper<T>(pub T);

        impl<T> crate::TypedMessage for Wrapper<T>
        where
            T: serde::Serialize + serde::de::DeserializeOwned + 'static,
        {
            type Codec = crate::BincodeCodec;

            fn type_name() -> &'static str {
                "nested.Wrapper"
            }
        }
    }

    #[test]
    fn test_protobuf_round_trip() {
        let msg = ChatMessage {
            content: "你好".to_string(),
            blob: (0..=255u8).collect(),
        };
        let encoded = encode_object(&msg).unwrap();
        let decoded: ChatMessage = decode_object(&encoded).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(<ProtobufCodec as Codec<ChatMessage>>::KIND, PayloadKind::Protobuf);
    }

    #[test]
    fn test_bincode_round_trip() {
        let msg = AMessage { a: 42, b: 43 };
        let encoded = encode_object(&msg).unwrap();
        // 两个定长 i32
        assert_eq!(encoded.len(), 8);
        assert_eq!(decode_object::<AMessage>(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_bincode_rejects_truncated_and_trailing() {
        let encoded = encode_object(&AMessage { a: 1, b: 2 }).unwrap();

        let truncated = decode_object::<AMessage>(&encoded[..5]);
        assert!(matches!(truncated, Err(CodecError::Decode(_))));

        let mut padded = encoded.to_vec();
        padded.push(0);
        assert!(matches!(
            decode_object::<AMessage>(&padded),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn test_protobuf_rejects_garbage() {
        // 字段 1 声明长度 10，但只有 1 个字节
        let result = decode_object::<ChatMessage>(&[0x0A, 0x0A, 0x41]);
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_default_type_name() {
        assert_eq!(AMessage::type_name(), "AMessage");
        assert_eq!(ChatMessage::type_name(), "ChatMessage");
        assert_eq!(nested::Wrapper::<u8>::type_name(), "nested.Wrapper");
    }

    #[derive(Serialize, Deserialize)]
    struct Pair<T>(T, T);

    impl<T> TypedMessage for Pair<T>
    where
        T: Serialize + serde::de::DeserializeOwned + 'static,
    {
        type Codec = BincodeCodec;
    }

    #[test]
    fn test_default_type_name_drops_generic_arguments() {
        // 默认名字无法区分泛型实例，需要区分时应覆盖 type_name
        assert_eq!(Pair::<u8>::type_name(), "Pair");
        assert_eq!(Pair::<u8>::type_name(), Pair::<u16>::type_name());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("a::b::Foo"), "Foo");
        assert_eq!(short_type_name("Foo"), "Foo");
        assert_eq!(short_type_name("a::Foo<b::Bar>"), "Foo");
    }

    #[test]
    fn test_payload_kind_display() {
        assert_eq!(PayloadKind::Bincode.to_string(), "bincode");
        assert_eq!(PayloadKind::Protobuf.to_string(), "protobuf");
    }
}
