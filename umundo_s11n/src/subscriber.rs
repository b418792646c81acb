//! 类型化订阅者
//!
//! 收到原始消息后按类型标签查找描述符、解码，再把对象连同原始消息
//! 交给应用的接收者。

use crate::codec::TypedMessage;
use crate::descriptor::TypeDescriptor;
use crate::error::{Result, S11nError};
use crate::metrics::SubscriberMetrics;
use crate::registry::TypeRegistry;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use umundo_core::{Message, PeerId, RawSubscription, Receiver, Transport};

/// 类型化接收者
///
/// `M` 是应用定义的和类型，回调中按变体匹配。
pub trait TypedReceiver<M>: Send + Sync {
    /// 收到解码后的对象
    fn receive_object(&self, object: M, msg: &Message);

    /// 消息因缺少标签、未知类型或解码失败被丢弃
    fn on_error(&self, error: &S11nError, msg: &Message) {
        let _ = (error, msg);
    }
}

impl<M, F> TypedReceiver<M> for F
where
    F: Fn(M, &Message) + Send + Sync,
{
    fn receive_object(&self, object: M, msg: &Message) {
        self(object, msg)
    }
}

/// 原始消息到类型化对象的分发器
///
/// 作为原始接收者注册到传输层。
pub struct TypedDispatcher<M> {
    channel: String,
    registry: Arc<TypeRegistry<M>>,
    receiver: Arc<dyn TypedReceiver<M>>,
    metrics: Arc<SubscriberMetrics>,
}

impl<M: 'static> TypedDispatcher<M> {
    pub fn new(
        channel: impl Into<String>,
        registry: Arc<TypeRegistry<M>>,
        receiver: Arc<dyn TypedReceiver<M>>,
        metrics: Arc<SubscriberMetrics>,
    ) -> Self {
        Self {
            channel: channel.into(),
            registry,
            receiver,
            metrics,
        }
    }

    /// 解析并解码一条消息，成功时交给接收者
    pub fn dispatch(&self, msg: &Message) -> Result<()> {
        let tag = msg
            .type_tag()
            .filter(|tag| !tag.is_empty())
            .ok_or(S11nError::MissingTypeTag)?;

        let descriptor = self.registry.resolve(tag)?;
        let object = descriptor
            .decode(msg.data())
            .map_err(|source| S11nError::Decode {
                tag: tag.to_string(),
                source,
            })?;

        self.receiver.receive_object(object, msg);
        Ok(())
    }
}

impl<M: 'static> Receiver for TypedDispatcher<M> {
    fn receive(&self, msg: &Message) {
        match self.dispatch(msg) {
            Ok(()) => {
                self.metrics.record_delivered();
                trace!(channel = %self.channel, %msg, "已分发类型化消息");
            }
            Err(err) => {
                self.metrics.record_failure(&err);
                warn!(channel = %self.channel, error = %err, %msg, "丢弃无法分发的消息");
                self.receiver.on_error(&err, msg);
            }
        }
    }
}

/// 订阅者状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// 未绑定到传输层
    Unbound,
    /// 已绑定，正在接收消息
    Bound,
}

impl fmt::Display for SubscriberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriberState::Unbound => write!(f, "unbound"),
            SubscriberState::Bound => write!(f, "bound"),
        }
    }
}

/// 类型化订阅者
///
/// 创建即绑定；`close()` 或释放时解除绑定。类型注册与绑定状态无关，
/// 可以在任何时候进行。
pub struct TypedSubscriber<M> {
    channel: String,
    registry: Arc<TypeRegistry<M>>,
    metrics: Arc<SubscriberMetrics>,
    raw: Option<Box<dyn RawSubscription>>,
}

impl<M: 'static> TypedSubscriber<M> {
    /// 订阅频道，使用空的注册表
    pub fn new<R>(transport: &dyn Transport, channel: &str, receiver: R) -> Result<Self>
    where
        R: TypedReceiver<M> + 'static,
    {
        Self::with_registry(transport, channel, TypeRegistry::new(), receiver)
    }

    /// 使用预先配置的注册表订阅频道
    pub fn with_registry<R>(
        transport: &dyn Transport,
        channel: &str,
        registry: TypeRegistry<M>,
        receiver: R,
    ) -> Result<Self>
    where
        R: TypedReceiver<M> + 'static,
    {
        let registry = Arc::new(registry);
        let metrics = Arc::new(SubscriberMetrics::new());
        let dispatcher = TypedDispatcher::new(
            channel,
            registry.clone(),
            Arc::new(receiver),
            metrics.clone(),
        );

        let raw = transport.subscribe(channel, Arc::new(dispatcher))?;
        debug!(subscriber = %raw.id(), channel, "类型化订阅者已绑定");

        Ok(Self {
            channel: channel.to_string(),
            registry,
            metrics,
            raw: Some(raw),
        })
    }

    /// 注册类型标签
    pub fn register_type(
        &self,
        tag: impl Into<String>,
        descriptor: TypeDescriptor<M>,
    ) -> Result<Option<TypeDescriptor<M>>> {
        self.registry.register(tag, descriptor)
    }

    /// 以类型名注册类型
    pub fn register<T>(&self) -> Result<Option<TypeDescriptor<M>>>
    where
        T: TypedMessage + Into<M>,
    {
        self.registry.register_type::<T>()
    }

    /// 类型注册表
    pub fn registry(&self) -> &TypeRegistry<M> {
        &self.registry
    }

    /// 分发指标
    pub fn metrics(&self) -> &SubscriberMetrics {
        &self.metrics
    }

    pub fn state(&self) -> SubscriberState {
        match &self.raw {
            Some(raw) if raw.is_active() => SubscriberState::Bound,
            _ => SubscriberState::Unbound,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.state() == SubscriberState::Bound
    }

    /// 频道名称
    pub fn channel_name(&self) -> &str {
        &self.channel
    }

    /// 订阅者标识，解除绑定后为 `None`
    pub fn id(&self) -> Option<PeerId> {
        self.raw.as_ref().map(|raw| raw.id())
    }

    /// 解除绑定，重复调用无副作用
    pub fn close(&mut self) {
        if let Some(raw) = self.raw.take() {
            raw.unsubscribe();
            debug!(subscriber = %raw.id(), channel = %self.channel, "类型化订阅者已解除绑定");
        }
    }
}

impl<M> Drop for TypedSubscriber<M> {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            raw.unsubscribe();
        }
    }
}
