//! 类型描述符
//!
//! 描述符把类型标签和解码例程绑在一起，解码结果是应用定义的和类型 `M`。

use crate::codec::{Codec, PayloadKind, TypedMessage};
use crate::error::CodecError;
use std::fmt;
use std::sync::Arc;

/// 解码例程
pub type DecodeFn<M> = dyn Fn(&[u8]) -> Result<M, CodecError> + Send + Sync;

/// 类型描述符
///
/// 克隆只复制内部的 `Arc`。
pub struct TypeDescriptor<M> {
    type_name: String,
    kind: PayloadKind,
    decode: Arc<DecodeFn<M>>,
}

impl<M: 'static> TypeDescriptor<M> {
    /// 由类型化消息构造描述符，解码后通过 `Into` 转为 `M`
    pub fn of<T>() -> Self
    where
        T: TypedMessage + Into<M>,
    {
        Self {
            type_name: T::type_name().to_string(),
            kind: <T::Codec as Codec<T>>::KIND,
            decode: Arc::new(|data: &[u8]| <T::Codec as Codec<T>>::decode(data).map(Into::into)),
        }
    }

    /// 由任意解码函数构造描述符
    pub fn from_fn<F>(type_name: impl Into<String>, kind: PayloadKind, decode: F) -> Self
    where
        F: Fn(&[u8]) -> Result<M, CodecError> + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            kind,
            decode: Arc::new(decode),
        }
    }
}

impl<M> TypeDescriptor<M> {
    /// 类型名
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// 负载格式
    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    /// 解码负载
    pub fn decode(&self, data: &[u8]) -> Result<M, CodecError> {
        (self.decode)(data)
    }
}

impl<M> Clone for TypeDescriptor<M> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name.clone(),
            kind: self.kind,
            decode: self.decode.clone(),
        }
    }
}

impl<M> fmt::Debug for TypeDescriptor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{BincodeCodec, encode_object};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Ping(u32);

    impl TypedMessage for Ping {
        type Codec = BincodeCodec;
    }

    #[derive(Debug, PartialEq)]
    enum Inbound {
        Ping(u32),
        Text(String),
    }

    impl From<Ping> for Inbound {
        fn from(ping: Ping) -> Self {
            Inbound::Ping(ping.0)
        }
    }

    #[test]
    fn test_descriptor_of_type() {
        let desc = TypeDescriptor::<Inbound>::of::<Ping>();
        assert_eq!(desc.type_name(), "Ping");
        assert_eq!(desc.kind(), PayloadKind::Bincode);

        let encoded = encode_object(&Ping(7)).unwrap();
        assert_eq!(desc.decode(&encoded).unwrap(), Inbound::Ping(7));
        assert!(desc.decode(&encoded[..2]).is_err());
    }

    #[test]
    fn test_descriptor_from_fn() {
        let desc = TypeDescriptor::from_fn("Text", PayloadKind::Bincode, |data: &[u8]| {
            String::from_utf8(data.to_vec())
                .map(Inbound::Text)
                .map_err(|e| CodecError::Decode(e.to_string()))
        });

        let copy = desc.clone();
        assert_eq!(copy.decode(b"hi").unwrap(), Inbound::Text("hi".to_string()));
        assert!(copy.decode(&[0xFF]).is_err());
        assert!(format!("{:?}", desc).contains("Text"));
    }
}
