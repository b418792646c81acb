//! 进程内发布者

use crate::loopback::transport::Domain;
use crate::protocol::MessageFrame;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, trace, warn};
use umundo_core::transport::Result;
use umundo_core::{Greeter, Message, PeerId, RawPublisher, TransportError};

/// 进程内发布者
///
/// 释放时从域中移除。
pub struct LoopbackPublisher {
    id: PeerId,
    channel: String,
    domain: Arc<Domain>,
    subscriber_count: watch::Receiver<usize>,
}

impl LoopbackPublisher {
    pub(crate) fn new(
        id: PeerId,
        channel: String,
        domain: Arc<Domain>,
        subscriber_count: watch::Receiver<usize>,
    ) -> Self {
        Self {
            id,
            channel,
            domain,
            subscriber_count,
        }
    }

    /// 当前匹配的订阅者数量
    pub fn subscriber_count(&self) -> usize {
        *self.subscriber_count.borrow()
    }
}

/// 经过一次帧编解码，确保投递的是线路格式还原出的消息
fn wire_round_trip(msg: &Message) -> Result<Message> {
    let mut buf =
        MessageFrame::encode(msg).map_err(|e| TransportError::Encoding(e.to_string()))?;
    MessageFrame::decode(&mut buf)
        .map_err(|e| TransportError::Encoding(e.to_string()))?
        .ok_or_else(|| TransportError::Encoding("帧不完整".to_string()))
}

#[async_trait]
impl RawPublisher for LoopbackPublisher {
    fn id(&self) -> PeerId {
        self.id
    }

    fn channel_name(&self) -> &str {
        &self.channel
    }

    async fn publish(&self, msg: Message) -> Result<()> {
        let limit = self.domain.config.max_payload_size;
        if msg.size() > limit {
            return Err(TransportError::PayloadTooLarge {
                size: msg.size(),
                limit,
            });
        }

        let msg = if self.domain.config.wire_encoding {
            wire_round_trip(&msg)?
        } else {
            msg
        };

        let routes = self.domain.registry.routes(&self.channel)?;
        self.domain.metrics.record_published(msg.size());
        trace!(publisher = %self.id, routes = routes.len(), %msg, "发布消息");

        for route in routes {
            if route.queue.send(msg.clone()).await.is_ok() {
                self.domain.metrics.record_delivery();
            } else {
                // 订阅者在发布过程中离开
                self.domain.metrics.record_dropped();
                trace!(subscriber = %route.subscriber, "丢弃投递");
            }
        }
        Ok(())
    }

    fn set_greeter(&self, greeter: Option<Arc<dyn Greeter>>) {
        if let Err(e) = self.domain.registry.set_greeter(self.id, greeter) {
            warn!(publisher = %self.id, error = %e, "设置通知者失败");
        }
    }

    fn subscribers(&self) -> Vec<PeerId> {
        match self.domain.registry.subscribers_of(&self.channel) {
            Ok(ids) => ids,
            Err(e) => {
                warn!(publisher = %self.id, error = %e, "读取订阅者失败");
                Vec::new()
            }
        }
    }

    async fn wait_for_subscribers(&self, count: usize, timeout: Option<Duration>) -> usize {
        let mut rx = self.subscriber_count.clone();
        let wait = async {
            loop {
                let ready = *rx.borrow_and_update() >= count;
                if ready || rx.changed().await.is_err() {
                    break;
                }
            }
        };

        match timeout {
            Some(limit) => {
                if tokio::time::timeout(limit, wait).await.is_err() {
                    trace!(publisher = %self.id, count, "等待订阅者超时");
                }
            }
            None => wait.await,
        }
        self.subscriber_count()
    }
}

impl Drop for LoopbackPublisher {
    fn drop(&mut self) {
        match self.domain.registry.remove_publisher(self.id) {
            Ok(true) => {
                self.domain.metrics.dec_publishers();
                debug!(publisher = %self.id, channel = %self.channel, "发布者已离开");
            }
            Ok(false) => {}
            Err(e) => warn!(publisher = %self.id, error = %e, "移除发布者失败"),
        }
    }
}
