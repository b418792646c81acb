//! 类型化发布者
//!
//! 在原始发布者之上完成对象编码并写入类型标签。

use crate::codec::{TypedMessage, encode_object};
use crate::error::{Result, S11nError};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Duration;
use tracing::trace;
use umundo_core::{Greeter, Message, PeerId, RawPublisher, Transport};

/// 订阅者加入/离开通知
///
/// 回调拿到的是发布者本身，可以直接向新订阅者发送欢迎消息。
pub trait TypedGreeter: Send + Sync {
    /// 订阅者加入
    fn welcome(&self, publisher: &TypedPublisher, subscriber: PeerId);

    /// 订阅者离开
    fn farewell(&self, publisher: &TypedPublisher, subscriber: PeerId);
}

/// 类型化发布者
///
/// 克隆共享同一个原始发布者。
#[derive(Clone)]
pub struct TypedPublisher {
    inner: Arc<PublisherInner>,
}

struct PublisherInner {
    raw: Arc<dyn RawPublisher>,
    /// 每条消息都附带的元数据
    meta: RwLock<BTreeMap<String, String>>,
}

impl TypedPublisher {
    /// 在频道上创建发布者
    pub fn new(transport: &dyn Transport, channel: &str) -> Result<Self> {
        let raw = transport.advertise(channel)?;
        Ok(Self::from_raw(raw))
    }

    /// 包装已有的原始发布者
    pub fn from_raw(raw: Arc<dyn RawPublisher>) -> Self {
        Self {
            inner: Arc::new(PublisherInner {
                raw,
                meta: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    /// 编码对象并组装消息
    ///
    /// `tag` 为 `None` 时使用类型名。固定元数据先写入，类型标签最后写入。
    pub fn prepare_message<T: TypedMessage>(&self, tag: Option<&str>, obj: &T) -> Result<Message> {
        let tag = tag.unwrap_or_else(|| T::type_name());
        if tag.is_empty() {
            return Err(S11nError::EmptyTypeTag);
        }

        let data = encode_object(obj).map_err(|source| S11nError::Encode {
            tag: tag.to_string(),
            source,
        })?;

        let mut msg = Message::with_data(data);
        {
            let meta = self
                .inner
                .meta
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            for (key, value) in meta.iter() {
                msg.put_meta(key.as_str(), value.as_str());
            }
        }
        msg.set_type_tag(tag);
        Ok(msg)
    }

    /// 以类型名为标签发送对象
    pub async fn send_object<T: TypedMessage>(&self, obj: &T) -> Result<()> {
        let msg = self.prepare_message(None, obj)?;
        self.send(msg).await
    }

    /// 以指定标签发送对象
    pub async fn send_object_as<T: TypedMessage>(&self, tag: &str, obj: &T) -> Result<()> {
        let msg = self.prepare_message(Some(tag), obj)?;
        self.send(msg).await
    }

    /// 发送已组装好的消息，消息必须带有非空的类型标签
    pub async fn send(&self, msg: Message) -> Result<()> {
        if msg.type_tag().is_none_or(str::is_empty) {
            return Err(S11nError::MissingTypeTag);
        }
        trace!(publisher = %self.id(), %msg, "发送类型化消息");
        self.inner.raw.publish(msg).await?;
        Ok(())
    }

    /// 设置每条消息都附带的元数据
    pub fn put_meta(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner
            .meta
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    /// 移除固定元数据
    pub fn clear_meta(&self, key: &str) -> Option<String> {
        self.inner
            .meta
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// 设置加入/离开通知，替换之前的通知
    pub fn set_greeter(&self, greeter: Arc<dyn TypedGreeter>) {
        let forwarder = GreeterForwarder {
            publisher: Arc::downgrade(&self.inner),
            greeter,
        };
        self.inner.raw.set_greeter(Some(Arc::new(forwarder)));
    }

    /// 清除加入/离开通知
    pub fn clear_greeter(&self) {
        self.inner.raw.set_greeter(None);
    }

    /// 当前订阅者
    pub fn subscribers(&self) -> Vec<PeerId> {
        self.inner.raw.subscribers()
    }

    /// 指定订阅者是否在接收本发布者的消息
    pub fn is_publishing_to(&self, subscriber: PeerId) -> bool {
        self.subscribers().contains(&subscriber)
    }

    /// 等待至少 `count` 个订阅者，返回等待结束时的订阅者数量
    pub async fn wait_for_subscribers(&self, count: usize, timeout: Option<Duration>) -> usize {
        self.inner.raw.wait_for_subscribers(count, timeout).await
    }

    /// 频道名称
    pub fn channel_name(&self) -> &str {
        self.inner.raw.channel_name()
    }

    /// 发布者标识
    pub fn id(&self) -> PeerId {
        self.inner.raw.id()
    }
}

/// 把原始通知转发给类型化通知
///
/// 只持有发布者的弱引用，发布者释放后通知被忽略。
struct GreeterForwarder {
    publisher: Weak<PublisherInner>,
    greeter: Arc<dyn TypedGreeter>,
}

impl GreeterForwarder {
    fn publisher(&self) -> Option<TypedPublisher> {
        self.publisher
            .upgrade()
            .map(|inner| TypedPublisher { inner })
    }
}

impl Greeter for GreeterForwarder {
    fn welcome(&self, _publisher: PeerId, subscriber: PeerId) {
        if let Some(publisher) = self.publisher() {
            self.greeter.welcome(&publisher, subscriber);
        }
    }

    fn farewell(&self, _publisher: PeerId, subscriber: PeerId) {
        if let Some(publisher) = self.publisher() {
            self.greeter.farewell(&publisher, subscriber);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{BincodeCodec, decode_object};
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use std::sync::Mutex;
    use umundo_core::TransportError;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct AMessage {
        a: i32,
        b: i32,
    }

    impl TypedMessage for AMessage {
        type Codec = BincodeCodec;
    }

    // 记录发布内容的原始发布者
    #[derive(Default)]
    struct RecordingPublisher {
        sent: Mutex<Vec<Message>>,
        greeter: Mutex<Option<Arc<dyn Greeter>>>,
        fail: bool,
    }

    #[async_trait]
    impl RawPublisher for RecordingPublisher {
        fn id(&self) -> PeerId {
            PeerId::new(1)
        }

        fn channel_name(&self) -> &str {
            "fooChannel"
        }

        async fn publish(&self, msg: Message) -> std::result::Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::Closed("fooChannel".to_string()));
            }
            self.sent.lock().unwrap().push(msg);
            Ok(())
        }

        fn set_greeter(&self, greeter: Option<Arc<dyn Greeter>>) {
            *self.greeter.lock().unwrap() = greeter;
        }

        fn subscribers(&self) -> Vec<PeerId> {
            vec![PeerId::new(7)]
        }

        async fn wait_for_subscribers(&self, _count: usize, _timeout: Option<Duration>) -> usize {
            1
        }
    }

    fn publisher() -> (TypedPublisher, Arc<RecordingPublisher>) {
        let raw = Arc::new(RecordingPublisher::default());
        (TypedPublisher::from_raw(raw.clone()), raw)
    }

    #[tokio::test]
    async fn test_send_object_uses_type_name() {
        let (publisher, raw) = publisher();
        publisher.send_object(&AMessage { a: 42, b: 43 }).await.unwrap();

        let sent = raw.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].type_tag(), Some("AMessage"));
        let decoded: AMessage = decode_object(sent[0].data()).unwrap();
        assert_eq!(decoded, AMessage { a: 42, b: 43 });
    }

    #[tokio::test]
    async fn test_send_object_as_explicit_tag() {
        let (publisher, raw) = publisher();
        publisher
            .send_object_as("org.example.A", &AMessage { a: 1, b: 2 })
            .await
            .unwrap();
        assert_eq!(raw.sent.lock().unwrap()[0].type_tag(), Some("org.example.A"));
    }

    #[tokio::test]
    async fn test_empty_tag_rejected() {
        let (publisher, raw) = publisher();
        let result = publisher.send_object_as("", &AMessage { a: 1, b: 2 }).await;
        assert!(matches!(result, Err(S11nError::EmptyTypeTag)));
        assert!(raw.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_requires_tag() {
        let (publisher, _raw) = publisher();
        let result = publisher.send(Message::with_data("raw")).await;
        assert!(matches!(result, Err(S11nError::MissingTypeTag)));

        let mut msg = Message::with_data("raw");
        msg.set_type_tag("");
        let result = publisher.send(msg).await;
        assert!(matches!(result, Err(S11nError::MissingTypeTag)));
    }

    #[tokio::test]
    async fn test_mandatory_meta_and_tag_wins() {
        let (publisher, raw) = publisher();
        publisher.put_meta("sender", "alice");
        publisher.put_meta(umundo_core::TYPE_META_KEY, "Spoofed");
        publisher.send_object(&AMessage { a: 0, b: 0 }).await.unwrap();

        assert_eq!(publisher.clear_meta("sender"), Some("alice".to_string()));
        publisher.send_object(&AMessage { a: 0, b: 0 }).await.unwrap();

        let sent = raw.sent.lock().unwrap();
        assert_eq!(sent[0].get_meta("sender"), Some("alice"));
        assert_eq!(sent[0].type_tag(), Some("AMessage"));
        assert!(sent[1].get_meta("sender").is_none());
    }

    #[tokio::test]
    async fn test_transport_error_returned() {
        let raw = Arc::new(RecordingPublisher {
            fail: true,
            ..RecordingPublisher::default()
        });
        let publisher = TypedPublisher::from_raw(raw);
        let result = publisher.send_object(&AMessage { a: 1, b: 1 }).await;
        assert!(matches!(result, Err(S11nError::Transport(TransportError::Closed(_)))));
    }

    #[test]
    fn test_greeter_forwarding() {
        #[derive(Default)]
        struct Counter {
            seen: Mutex<Vec<(String, PeerId, PeerId)>>,
        }

        impl TypedGreeter for Counter {
            fn welcome(&self, publisher: &TypedPublisher, subscriber: PeerId) {
                self.seen
                    .lock()
                    .unwrap()
                    .push(("welcome".into(), publisher.id(), subscriber));
            }

            fn farewell(&self, publisher: &TypedPublisher, subscriber: PeerId) {
                self.seen
                    .lock()
                    .unwrap()
                    .push(("farewell".into(), publisher.id(), subscriber));
            }
        }

        let (publisher, raw) = publisher();
        let counter = Arc::new(Counter::default());
        publisher.set_greeter(counter.clone());

        let forwarder = raw.greeter.lock().unwrap().clone().unwrap();
        forwarder.welcome(PeerId::new(1), PeerId::new(7));
        forwarder.farewell(PeerId::new(1), PeerId::new(7));

        let seen = counter.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ("welcome".to_string(), PeerId::new(1), PeerId::new(7)));
        assert_eq!(seen[1].0, "farewell");
        drop(seen);

        publisher.clear_greeter();
        assert!(raw.greeter.lock().unwrap().is_none());
    }

    #[test]
    fn test_forwarder_ignores_dropped_publisher() {
        struct Panicking;

        impl TypedGreeter for Panicking {
            fn welcome(&self, _: &TypedPublisher, _: PeerId) {
                panic!("发布者已释放");
            }

            fn farewell(&self, _: &TypedPublisher, _: PeerId) {
                panic!("发布者已释放");
            }
        }

        let (publisher, raw) = publisher();
        publisher.set_greeter(Arc::new(Panicking));
        drop(publisher);

        let forwarder = raw.greeter.lock().unwrap().clone().unwrap();
        forwarder.welcome(PeerId::new(1), PeerId::new(2));
    }

    #[test]
    fn test_subscriber_queries() {
        let (publisher, _raw) = publisher();
        assert!(publisher.is_publishing_to(PeerId::new(7)));
        assert!(!publisher.is_publishing_to(PeerId::new(8)));
        assert_eq!(publisher.channel_name(), "fooChannel");
        assert_eq!(publisher.clone().id(), PeerId::new(1));
    }
}
