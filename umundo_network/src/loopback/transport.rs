//! 进程内传输
//!
//! 同一个 [`LoopbackTransport`] 及其克隆共享一个域，域内的发布者按频道前缀
//! 把消息投递给订阅者。

use crate::loopback::metrics::TransportMetrics;
use crate::loopback::publisher::LoopbackPublisher;
use crate::loopback::registry::EndpointRegistry;
use crate::loopback::subscription::LoopbackSubscription;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};
use umundo_config::TransportConfig;
use umundo_core::transport::Result;
use umundo_core::{
    Message, PeerId, PeerIdGenerator, RawPublisher, RawSubscription, Receiver, Transport,
    TransportError,
};

/// 域内共享状态
pub(crate) struct Domain {
    pub config: TransportConfig,
    pub registry: EndpointRegistry,
    pub metrics: TransportMetrics,
    pub ids: PeerIdGenerator,
}

/// 进程内传输
#[derive(Clone)]
pub struct LoopbackTransport {
    domain: Arc<Domain>,
}

impl LoopbackTransport {
    /// 使用配置创建新的域
    pub fn new(config: TransportConfig) -> Self {
        debug!(domain = %config.domain, "创建进程内传输域");
        Self {
            domain: Arc::new(Domain {
                config,
                registry: EndpointRegistry::new(),
                metrics: TransportMetrics::new(),
                ids: PeerIdGenerator::new(),
            }),
        }
    }

    /// 传输配置
    pub fn config(&self) -> &TransportConfig {
        &self.domain.config
    }

    /// 域名称
    pub fn domain(&self) -> &str {
        &self.domain.config.domain
    }

    /// 传输指标
    pub fn metrics(&self) -> &TransportMetrics {
        &self.domain.metrics
    }

    /// 在频道上创建具体类型的发布者
    pub fn advertise_loopback(&self, channel: &str) -> Result<LoopbackPublisher> {
        let id = self.domain.ids.next();
        let subscriber_count = self.domain.registry.add_publisher(id, channel)?;
        self.domain.metrics.inc_publishers();

        debug!(publisher = %id, channel, "发布者已加入");
        Ok(LoopbackPublisher::new(
            id,
            channel.to_string(),
            self.domain.clone(),
            subscriber_count,
        ))
    }

    /// 订阅频道，返回具体类型的订阅句柄
    ///
    /// 必须在 tokio 运行时内调用，每个订阅拥有一个独立的投递任务。
    pub fn subscribe_loopback(
        &self,
        channel: &str,
        receiver: Arc<dyn Receiver>,
    ) -> Result<LoopbackSubscription> {
        let handle = Handle::try_current().map_err(|e| TransportError::Runtime(e.to_string()))?;

        let id = self.domain.ids.next();
        let (queue, rx) = mpsc::channel(self.domain.config.queue_capacity.max(1));
        let task = handle.spawn(deliver(id, rx, receiver));

        let greetings = match self.domain.registry.add_subscriber(id, channel, queue) {
            Ok(greetings) => greetings,
            Err(e) => {
                task.abort();
                return Err(e);
            }
        };
        self.domain.metrics.inc_subscribers();

        for greeting in greetings {
            greeting.greeter.welcome(greeting.publisher, id);
        }

        debug!(subscriber = %id, channel, "订阅者已加入");
        Ok(LoopbackSubscription::new(
            id,
            channel.to_string(),
            self.domain.clone(),
            task,
        ))
    }

    /// 当前发布者数量
    pub fn publisher_count(&self) -> Result<usize> {
        self.domain.registry.publisher_count()
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> Result<usize> {
        self.domain.registry.subscriber_count()
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl Transport for LoopbackTransport {
    fn advertise(&self, channel: &str) -> Result<Arc<dyn RawPublisher>> {
        Ok(Arc::new(self.advertise_loopback(channel)?))
    }

    fn subscribe(
        &self,
        channel: &str,
        receiver: Arc<dyn Receiver>,
    ) -> Result<Box<dyn RawSubscription>> {
        Ok(Box::new(self.subscribe_loopback(channel, receiver)?))
    }
}

/// 投递任务：按到达顺序把队列中的消息交给接收者
///
/// 接收者在回调中 panic 只丢弃当前消息，任务继续投递后续消息。
async fn deliver(id: PeerId, mut queue: mpsc::Receiver<Message>, receiver: Arc<dyn Receiver>) {
    while let Some(msg) = queue.recv().await {
        if catch_unwind(AssertUnwindSafe(|| receiver.receive(&msg))).is_err() {
            warn!(subscriber = %id, %msg, "接收者处理消息时 panic，消息已丢弃");
        }
    }
    trace!(subscriber = %id, "投递任务结束");
}
