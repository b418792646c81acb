//! 类型化聊天示例
//!
//! 演示：
//! - Protobuf 和 Bincode 两种负载
//! - 订阅者加入时由发布者发送欢迎消息
//! - 通过类型目录解析未显式注册的类型
//!
//! 运行：`cargo run --example typed_pubsub`

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use umundo::prelude::*;

#[derive(Clone, PartialEq, prost::Message)]
struct ChatMessage {
    #[prost(string, tag = "1")]
    username: String,
    #[prost(string, tag = "2")]
    message: String,
}

impl TypedMessage for ChatMessage {
    type Codec = ProtobufCodec;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Presence {
    username: String,
    online: bool,
}

impl TypedMessage for Presence {
    type Codec = BincodeCodec;
}

/// 聊天室接受的消息
#[derive(Debug)]
enum ChatEvent {
    Chat(ChatMessage),
    Presence(Presence),
}

impl From<ChatMessage> for ChatEvent {
    fn from(msg: ChatMessage) -> Self {
        ChatEvent::Chat(msg)
    }
}

impl From<Presence> for ChatEvent {
    fn from(msg: Presence) -> Self {
        ChatEvent::Presence(msg)
    }
}

struct ChatPrinter {
    name: &'static str,
}

impl TypedReceiver<ChatEvent> for ChatPrinter {
    fn receive_object(&self, event: ChatEvent, msg: &Message) {
        match event {
            ChatEvent::Chat(chat) => {
                println!("[{}] {}: {}", self.name, chat.username, chat.message)
            }
            ChatEvent::Presence(p) => println!(
                "[{}] {} {} (标签 {})",
                self.name,
                p.username,
                if p.online { "上线" } else { "下线" },
                msg.type_tag().unwrap_or("-")
            ),
        }
    }

    fn on_error(&self, error: &S11nError, _msg: &Message) {
        println!("[{}] 丢弃消息: {}", self.name, error);
    }
}

/// 新订阅者加入时发送欢迎消息
struct WelcomeGreeter;

impl TypedGreeter for WelcomeGreeter {
    fn welcome(&self, publisher: &TypedPublisher, subscriber: PeerId) {
        let publisher = publisher.clone();
        tokio::spawn(async move {
            let hello = ChatMessage {
                username: "server".to_string(),
                message: format!("欢迎 {}", subscriber),
            };
            if let Err(e) = publisher.send_object(&hello).await {
                tracing::warn!(error = %e, "发送欢迎消息失败");
            }
        });
    }

    fn farewell(&self, _publisher: &TypedPublisher, subscriber: PeerId) {
        println!("{} 离开了聊天室", subscriber);
    }
}

#[tokio::main]
async fn main() -> umundo::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== uMundo 类型化聊天示例 ===\n");

    let node = Node::builder().domain("chat").wire_encoding(true).build()?;

    let publisher = node.publisher("s11nChat")?;
    publisher.put_meta("room", "lobby");
    publisher.set_greeter(Arc::new(WelcomeGreeter));

    // 显式注册
    let alice = node.subscriber("s11nChat", ChatPrinter { name: "alice" })?;
    alice.register::<ChatMessage>()?;
    alice.register::<Presence>()?;

    // 依赖类型目录
    let catalog = Arc::new(
        TypeCatalog::<ChatEvent>::new()
            .with::<ChatMessage>()
            .with::<Presence>(),
    );
    let bob = node.subscriber_with_catalog("s11n", catalog, ChatPrinter { name: "bob" })?;
    bob.registry().set_auto_register(true);

    publisher
        .wait_for_subscribers(2, Some(Duration::from_secs(1)))
        .await;

    publisher
        .send_object(&Presence {
            username: "carol".to_string(),
            online: true,
        })
        .await?;
    publisher
        .send_object_as(
            "chat.ChatMessage",
            &ChatMessage {
                username: "carol".to_string(),
                message: "大家好".to_string(),
            },
        )
        .await?;

    tokio::time::sleep(Duration::from_millis(100)).await;

    println!();
    println!("alice: {}", alice.metrics().summary());
    println!("bob: {}", bob.metrics().summary());
    drop(bob);

    println!();
    println!("{}", node.metrics().summary());
    Ok(())
}
