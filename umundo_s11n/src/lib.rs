//! uMundo 类型化发布/订阅
//!
//! 在原始发布/订阅通道之上提供类型化的对象收发：
//! - 发送端把对象编码为负载，并在 `um.s11n.type` 元数据中写入类型标签
//! - 接收端按类型标签在注册表中查找解码例程，把对象交给应用回调
//!
//! 支持 Protobuf（`prost`）和 Bincode（`serde`）两种负载格式。

pub mod catalog;
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod metrics;
pub mod publisher;
pub mod registry;
pub mod subscriber;

// 导出主要类型到 crate root
pub use crate::catalog::TypeCatalog;
pub use crate::codec::{
    BincodeCodec, Codec, PayloadKind, ProtobufCodec, TypedMessage, decode_object, encode_object,
};
pub use crate::descriptor::TypeDescriptor;
pub use crate::error::{CodecError, Result, S11nError};
pub use crate::metrics::SubscriberMetrics;
pub use crate::publisher::{TypedGreeter, TypedPublisher};
pub use crate::registry::TypeRegistry;
pub use crate::subscriber::{SubscriberState, TypedDispatcher, TypedReceiver, TypedSubscriber};

// 预导出
pub mod prelude {
    pub use crate::codec::{BincodeCodec, ProtobufCodec, TypedMessage};
    pub use crate::descriptor::TypeDescriptor;
    pub use crate::error::S11nError;
    pub use crate::publisher::{TypedGreeter, TypedPublisher};
    pub use crate::registry::TypeRegistry;
    pub use crate::subscriber::{TypedReceiver, TypedSubscriber};
    pub use umundo_core::{Message, PeerId};
}
