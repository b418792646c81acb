//! 进程内订阅

use crate::loopback::transport::Domain;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use umundo_core::{PeerId, RawSubscription};

/// 进程内订阅句柄
///
/// 取消订阅会停止投递任务，尚未投递的消息被丢弃。释放句柄时自动取消订阅。
pub struct LoopbackSubscription {
    id: PeerId,
    channel: String,
    domain: Arc<Domain>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl LoopbackSubscription {
    pub(crate) fn new(id: PeerId, channel: String, domain: Arc<Domain>, task: JoinHandle<()>) -> Self {
        Self {
            id,
            channel,
            domain,
            task: Mutex::new(Some(task)),
        }
    }
}

impl RawSubscription for LoopbackSubscription {
    fn id(&self) -> PeerId {
        self.id
    }

    fn channel_name(&self) -> &str {
        &self.channel
    }

    fn is_active(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn unsubscribe(&self) {
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(task) = task else {
            return;
        };
        task.abort();

        match self.domain.registry.remove_subscriber(self.id) {
            Ok(Some(greetings)) => {
                self.domain.metrics.dec_subscribers();
                for greeting in greetings {
                    greeting.greeter.farewell(greeting.publisher, self.id);
                }
                debug!(subscriber = %self.id, channel = %self.channel, "订阅者已离开");
            }
            Ok(None) => {}
            Err(e) => warn!(subscriber = %self.id, error = %e, "移除订阅者失败"),
        }
    }
}

impl Drop for LoopbackSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
