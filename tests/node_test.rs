//! Node 集成测试

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use umundo::prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AMessage {
    a: i32,
    b: i32,
}

impl TypedMessage for AMessage {
    type Codec = BincodeCodec;
}

#[derive(Clone, PartialEq, prost::Message)]
struct Greeting {
    #[prost(string, tag = "1")]
    text: String,
}

impl TypedMessage for Greeting {
    type Codec = ProtobufCodec;
}

#[derive(Debug, Clone, PartialEq)]
enum Inbound {
    A(AMessage),
    Greeting(Greeting),
}

impl From<AMessage> for Inbound {
    fn from(msg: AMessage) -> Self {
        Inbound::A(msg)
    }
}

impl From<Greeting> for Inbound {
    fn from(msg: Greeting) -> Self {
        Inbound::Greeting(msg)
    }
}

type Delivered = (Inbound, Option<String>);

fn forwarder() -> (
    impl Fn(Inbound, &Message) + Send + Sync + 'static,
    mpsc::UnboundedReceiver<Delivered>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let receiver = move |obj: Inbound, msg: &Message| {
        let _ = tx.send((obj, msg.type_tag().map(str::to_string)));
    };
    (receiver, rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Delivered>) -> Delivered {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("等待对象超时")
        .expect("通道已关闭")
}

#[tokio::test]
async fn test_node_end_to_end() {
    let node = Node::new();
    let (receiver, mut rx) = forwarder();
    let sub = node.subscriber("fooChannel", receiver).unwrap();
    sub.register::<AMessage>().unwrap();

    let publisher = node.publisher("fooChannel").unwrap();
    assert_eq!(publisher.wait_for_subscribers(1, None).await, 1);
    publisher.send_object(&AMessage { a: 42, b: 43 }).await.unwrap();

    let (obj, tag) = next(&mut rx).await;
    assert_eq!(obj, Inbound::A(AMessage { a: 42, b: 43 }));
    assert_eq!(tag.as_deref(), Some("AMessage"));
    assert_eq!(node.metrics().total_messages_published(), 1);
}

#[tokio::test]
async fn test_node_catalog_fallback() {
    let node = Node::builder().auto_register_types(true).build().unwrap();
    let catalog = Arc::new(
        TypeCatalog::<Inbound>::new()
            .with::<AMessage>()
            .with::<Greeting>(),
    );
    let (receiver, mut rx) = forwarder();
    let sub = node
        .subscriber_with_catalog("news", catalog, receiver)
        .unwrap();
    assert!(sub.registry().is_empty().unwrap());

    let publisher = node.publisher("news").unwrap();
    publisher.wait_for_subscribers(1, None).await;
    publisher
        .send_object_as(
            "org.example.Greeting",
            &Greeting {
                text: "hello".to_string(),
            },
        )
        .await
        .unwrap();

    let (obj, tag) = next(&mut rx).await;
    assert_eq!(
        obj,
        Inbound::Greeting(Greeting {
            text: "hello".to_string()
        })
    );
    assert_eq!(tag.as_deref(), Some("org.example.Greeting"));
    assert!(sub.registry().contains("Greeting").unwrap());
}

#[tokio::test]
async fn test_node_catalog_disabled_by_default() {
    let node = Node::new();
    let catalog = Arc::new(TypeCatalog::<Inbound>::new().with::<AMessage>());
    let (receiver, mut rx) = forwarder();
    let sub = node
        .subscriber_with_catalog("news", catalog, receiver)
        .unwrap();

    let publisher = node.publisher("news").unwrap();
    publisher.wait_for_subscribers(1, None).await;
    publisher.send_object(&AMessage { a: 1, b: 2 }).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(sub.metrics().unknown_type(), 1);

    // 打开后同一标签可以解析
    sub.registry().set_auto_register(true);
    publisher.send_object(&AMessage { a: 3, b: 4 }).await.unwrap();
    let (obj, _) = next(&mut rx).await;
    assert_eq!(obj, Inbound::A(AMessage { a: 3, b: 4 }));
}

#[tokio::test]
async fn test_node_reject_policy() {
    let node = Node::builder()
        .duplicate_policy(DuplicatePolicy::Reject)
        .build()
        .unwrap();
    let (receiver, _rx) = forwarder();
    let sub = node.subscriber("dup", receiver).unwrap();

    sub.register::<AMessage>().unwrap();
    let err = sub.register::<AMessage>().unwrap_err();
    assert!(matches!(err, S11nError::DuplicateRegistration(tag) if tag == "AMessage"));
}

#[tokio::test]
async fn test_node_payload_limit() {
    let node = Node::builder().max_payload_size(8).build().unwrap();
    let publisher = node.publisher("small").unwrap();

    let err = publisher
        .send_object(&Greeting {
            text: "this text is longer than eight bytes".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, S11nError::Transport(_)));

    let err: umundo::Error = err.into();
    assert!(err.to_string().contains("8"));
}

#[tokio::test]
async fn test_node_from_file() {
    let path = std::env::temp_dir().join(format!("umundo-node-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
[transport]
domain = "fileDomain"
queue_capacity = 16
wire_encoding = true

[s11n]
duplicate_policy = "reject"
"#,
    )
    .unwrap();

    let node = Node::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(node.config().transport.domain, "fileDomain");
    assert_eq!(node.config().transport.queue_capacity, 16);
    assert!(node.config().transport.wire_encoding);
    assert_eq!(node.config().s11n.duplicate_policy, DuplicatePolicy::Reject);
}

#[test]
fn test_node_from_missing_file() {
    let err = Node::from_file("/nonexistent/umundo.toml").err().unwrap();
    assert!(matches!(err, umundo::Error::Config(_)));
}
