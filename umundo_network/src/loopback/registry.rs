//! 端点注册表
//!
//! 记录同一进程内域中的全部发布者和订阅者，并计算两者之间的匹配关系。
//! 注册表本身从不调用用户代码，所有回调由调用方在释放锁之后执行。

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{mpsc, watch};
use umundo_core::transport::{Result, channel_matches};
use umundo_core::{Greeter, Message, PeerId, TransportError};

/// 发布者条目
struct PublisherEntry {
    channel: String,
    greeter: Option<Arc<dyn Greeter>>,
    /// 匹配的订阅者数量
    subscriber_count: watch::Sender<usize>,
}

/// 订阅者条目
struct SubscriberEntry {
    channel: String,
    queue: mpsc::Sender<Message>,
}

/// 需要在锁外发出的加入/离开通知
pub(crate) struct Greeting {
    pub publisher: PeerId,
    pub greeter: Arc<dyn Greeter>,
}

/// 投递目标
pub(crate) struct Route {
    pub subscriber: PeerId,
    pub queue: mpsc::Sender<Message>,
}

/// 端点注册表
#[derive(Clone, Default)]
pub(crate) struct EndpointRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    publishers: HashMap<PeerId, PublisherEntry>,
    subscribers: HashMap<PeerId, SubscriberEntry>,
}

impl RegistryInner {
    fn matching_count(&self, publisher_channel: &str) -> usize {
        self.subscribers
            .values()
            .filter(|sub| channel_matches(&sub.channel, publisher_channel))
            .count()
    }

    /// 刷新与订阅频道匹配的发布者计数，并收集其通知者
    fn refresh_matching(&self, subscriber_channel: &str) -> Vec<Greeting> {
        let mut greetings = Vec::new();
        for (&id, entry) in &self.publishers {
            if !channel_matches(subscriber_channel, &entry.channel) {
                continue;
            }
            entry
                .subscriber_count
                .send_replace(self.matching_count(&entry.channel));
            if let Some(greeter) = &entry.greeter {
                greetings.push(Greeting {
                    publisher: id,
                    greeter: greeter.clone(),
                });
            }
        }
        greetings
    }
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RegistryInner>> {
        self.inner
            .read()
            .map_err(|e| TransportError::Poisoned(format!("获取读锁失败: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RegistryInner>> {
        self.inner
            .write()
            .map_err(|e| TransportError::Poisoned(format!("获取写锁失败: {}", e)))
    }

    /// 添加发布者，返回其订阅者计数的观察端
    pub fn add_publisher(&self, id: PeerId, channel: &str) -> Result<watch::Receiver<usize>> {
        let mut inner = self.write()?;
        let (tx, rx) = watch::channel(inner.matching_count(channel));
        inner.publishers.insert(
            id,
            PublisherEntry {
                channel: channel.to_string(),
                greeter: None,
                subscriber_count: tx,
            },
        );
        Ok(rx)
    }

    /// 移除发布者
    pub fn remove_publisher(&self, id: PeerId) -> Result<bool> {
        Ok(self.write()?.publishers.remove(&id).is_some())
    }

    /// 设置或清除发布者的通知者
    pub fn set_greeter(&self, id: PeerId, greeter: Option<Arc<dyn Greeter>>) -> Result<()> {
        let mut inner = self.write()?;
        match inner.publishers.get_mut(&id) {
            Some(entry) => {
                entry.greeter = greeter;
                Ok(())
            }
            None => Err(TransportError::Closed(id.to_string())),
        }
    }

    /// 添加订阅者，返回需要发出的加入通知
    pub fn add_subscriber(
        &self,
        id: PeerId,
        channel: &str,
        queue: mpsc::Sender<Message>,
    ) -> Result<Vec<Greeting>> {
        let mut inner = self.write()?;
        inner.subscribers.insert(
            id,
            SubscriberEntry {
                channel: channel.to_string(),
                queue,
            },
        );
        Ok(inner.refresh_matching(channel))
    }

    /// 移除订阅者，返回需要发出的离开通知
    ///
    /// 订阅者不存在时返回 `None`。
    pub fn remove_subscriber(&self, id: PeerId) -> Result<Option<Vec<Greeting>>> {
        let mut inner = self.write()?;
        match inner.subscribers.remove(&id) {
            Some(entry) => Ok(Some(inner.refresh_matching(&entry.channel))),
            None => Ok(None),
        }
    }

    /// 发布频道的全部投递目标
    pub fn routes(&self, publisher_channel: &str) -> Result<Vec<Route>> {
        let inner = self.read()?;
        Ok(inner
            .subscribers
            .iter()
            .filter(|(_, sub)| channel_matches(&sub.channel, publisher_channel))
            .map(|(&id, sub)| Route {
                subscriber: id,
                queue: sub.queue.clone(),
            })
            .collect())
    }

    /// 接收该发布频道消息的订阅者，按标识排序
    pub fn subscribers_of(&self, publisher_channel: &str) -> Result<Vec<PeerId>> {
        let mut ids: Vec<PeerId> = self
            .routes(publisher_channel)?
            .into_iter()
            .map(|route| route.subscriber)
            .collect();
        ids.sort();
        Ok(ids)
    }

    pub fn publisher_count(&self) -> Result<usize> {
        Ok(self.read()?.publishers.len())
    }

    pub fn subscriber_count(&self) -> Result<usize> {
        Ok(self.read()?.subscribers.len())
    }
}
