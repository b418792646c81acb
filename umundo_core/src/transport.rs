//! 原始传输层抽象
//!
//! 类型化层只通过这里的接口使用底层的发布/订阅引擎：
//! 创建发布者和订阅者、发送和接收原始字节加元数据、
//! 以及订阅者加入/离开的通知。

use crate::message::Message;
use crate::peer::PeerId;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// 传输错误
#[derive(Error, Debug)]
pub enum TransportError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 端点或传输已关闭
    #[error("端点已关闭: {0}")]
    Closed(String),

    /// 负载超过传输允许的大小
    #[error("消息负载过大: {size} 字节 (上限 {limit} 字节)")]
    PayloadTooLarge { size: usize, limit: usize },

    /// 线路编码失败
    #[error("线路编码失败: {0}")]
    Encoding(String),

    /// 缺少异步运行时
    #[error("运行时不可用: {0}")]
    Runtime(String),

    /// 内部锁中毒
    #[error("内部锁中毒: {0}")]
    Poisoned(String),

    /// 超时错误
    #[error("操作超时")]
    Timeout,
}

/// 传输层 Result 类型
pub type Result<T> = std::result::Result<T, TransportError>;

/// 原始消息接收者
///
/// 由传输层在其自己的执行上下文中调用。消息只在调用期间有效。
pub trait Receiver: Send + Sync {
    /// 收到一条消息
    fn receive(&self, msg: &Message);
}

impl<F> Receiver for F
where
    F: Fn(&Message) + Send + Sync,
{
    fn receive(&self, msg: &Message) {
        self(msg)
    }
}

/// 订阅者加入/离开通知
pub trait Greeter: Send + Sync {
    /// 新的订阅者开始接收该发布者的消息
    fn welcome(&self, publisher: PeerId, subscriber: PeerId);

    /// 订阅者不再接收该发布者的消息
    fn farewell(&self, publisher: PeerId, subscriber: PeerId);
}

/// 原始发布者
#[async_trait]
pub trait RawPublisher: Send + Sync {
    /// 发布者标识
    fn id(&self) -> PeerId;

    /// 频道名称
    fn channel_name(&self) -> &str;

    /// 发布一条消息
    ///
    /// 在传输层接受消息之前一直等待，不做重试。
    async fn publish(&self, msg: Message) -> Result<()>;

    /// 设置或清除加入/离开通知
    fn set_greeter(&self, greeter: Option<Arc<dyn Greeter>>);

    /// 当前接收该发布者消息的订阅者
    fn subscribers(&self) -> Vec<PeerId>;

    /// 等待至少 `count` 个订阅者，返回等待结束时的订阅者数量
    ///
    /// `timeout` 为 `None` 时一直等待。
    async fn wait_for_subscribers(&self, count: usize, timeout: Option<Duration>) -> usize;
}

/// 原始订阅句柄
///
/// 释放句柄等同于取消订阅。
pub trait RawSubscription: Send + Sync {
    /// 订阅者标识
    fn id(&self) -> PeerId;

    /// 频道名称
    fn channel_name(&self) -> &str;

    /// 订阅是否仍然有效
    fn is_active(&self) -> bool;

    /// 取消订阅，重复调用无副作用
    fn unsubscribe(&self);
}

/// 原始发布/订阅传输
pub trait Transport: Send + Sync {
    /// 在频道上创建发布者
    fn advertise(&self, channel: &str) -> Result<Arc<dyn RawPublisher>>;

    /// 订阅频道，收到的每条消息交给 `receiver`
    fn subscribe(
        &self,
        channel: &str,
        receiver: Arc<dyn Receiver>,
    ) -> Result<Box<dyn RawSubscription>>;
}

/// 订阅频道是否匹配发布频道
///
/// 订阅频道是发布频道的前缀即视为匹配。
pub fn channel_matches(subscriber_channel: &str, publisher_channel: &str) -> bool {
    publisher_channel.starts_with(subscriber_channel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_channel_matches_prefix() {
        assert!(channel_matches("foo", "foo"));
        assert!(channel_matches("foo", "fooChannel"));
        assert!(channel_matches("", "anything"));
        assert!(!channel_matches("fooChannel", "foo"));
        assert!(!channel_matches("bar", "foo"));
    }

    #[test]
    fn test_closure_receiver() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let receiver: Arc<dyn Receiver> = Arc::new(move |msg: &Message| {
            sink.lock().unwrap().push(msg.size());
        });

        receiver.receive(&Message::with_data(vec![1u8, 2, 3]));
        receiver.receive(&Message::new());

        assert_eq!(*seen.lock().unwrap(), vec![3, 0]);
    }

    #[test]
    fn test_payload_too_large_display() {
        let err = TransportError::PayloadTooLarge { size: 10, limit: 4 };
        assert_eq!(err.to_string(), "消息负载过大: 10 字节 (上限 4 字节)");
    }
}
