//! 编解码示例
//!
//! 演示负载编解码、类型注册表和类型目录，不涉及传输层。

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use umundo_s11n::{
    BincodeCodec, ProtobufCodec, TypeCatalog, TypeRegistry, TypedMessage, encode_object,
};

#[derive(Clone, PartialEq, prost::Message)]
struct ChatMessage {
    #[prost(string, tag = "1")]
    sender_id: String,
    #[prost(string, tag = "2")]
    content: String,
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

#[derive(Debug)]
enum Inbound {
    Chat(ChatMessage),
    A(AMessage),
}

impl From<ChatMessage> for Inbound {
    fn from(msg: ChatMessage) -> Self {
        Inbound::Chat(msg)
    }
}

impl From<AMessage> for Inbound {
    fn from(msg: AMessage) -> Self {
        Inbound::A(msg)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== uMundo 编解码示例 ===\n");

    println!("1. 编码:");
    let chat = ChatMessage {
        sender_id: "user_123".to_string(),
        content: "Hello, uMundo!".to_string(),
    };
    let chat_bytes = encode_object(&chat)?;
    let a_bytes = encode_object(&AMessage { a: 42, b: 43 })?;
    println!("   {} -> {} bytes", ChatMessage::type_name(), chat_bytes.len());
    println!("   {} -> {} bytes", AMessage::type_name(), a_bytes.len());
    println!();

    println!("2. 显式注册:");
    let registry = TypeRegistry::<Inbound>::new();
    registry.register_type::<ChatMessage>()?;
    let decoded = registry.resolve("ChatMessage")?.decode(&chat_bytes)?;
    println!("   ChatMessage -> {:?}", decoded);
    println!();

    println!("3. 类型目录回退:");
    let catalog = Arc::new(TypeCatalog::<Inbound>::new().with::<AMessage>());
    let registry = TypeRegistry::<Inbound>::new().with_catalog(catalog);
    registry.set_auto_register(true);
    let decoded = registry.resolve("org.example.AMessage")?.decode(&a_bytes)?;
    println!("   org.example.AMessage -> {:?}", decoded);
    println!("   已缓存标签: {:?}", registry.tags()?);
    println!();

    println!("4. 未知类型:");
    if let Err(e) = registry.resolve("Missing") {
        println!("   {}", e);
    }

    Ok(())
}
