//! Node and its builder
//!
//! Provides a config-driven entry point for typed publish/subscribe with
//! minimal boilerplate.

use crate::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use umundo_config::{DuplicatePolicy, UmundoConfig};
use umundo_network::{LoopbackTransport, TransportMetrics};
use umundo_s11n::{TypeCatalog, TypeRegistry, TypedPublisher, TypedReceiver, TypedSubscriber};

/// uMundo node
///
/// Cloning a node shares the underlying transport, so publishers and
/// subscribers created from any clone see each other.
///
/// # Example
///
/// ```rust,no_run,ignore
/// use umundo::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> umundo::Result<()> {
///     let node = Node::new();
///     let sub = node.subscriber("chat", |msg: Inbound, _: &Message| {
///         println!("Received: {:?}", msg);
///     })?;
///     sub.register::<ChatMessage>()?;
///
///     let publisher = node.publisher("chat")?;
///     publisher.send_object(&ChatMessage::default()).await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Node {
    config: UmundoConfig,
    transport: LoopbackTransport,
}

impl Node {
    /// Create a node with the default configuration
    pub fn new() -> Self {
        Self::from_valid_config(UmundoConfig::default())
    }

    /// Create a node with a custom configuration
    ///
    /// The configuration is validated first.
    pub fn with_config(config: UmundoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Load the configuration from a TOML file, apply `UMUNDO_*`
    /// environment overrides, and create a node
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(UmundoConfig::from_file_with_env(path)?)
    }

    /// Start building a node
    pub fn builder() -> NodeBuilder {
        NodeBuilder::new()
    }

    fn from_valid_config(config: UmundoConfig) -> Self {
        info!(domain = %config.transport.domain, "uMundo 节点启动");
        debug!("{}", config.summary());
        Self {
            transport: LoopbackTransport::new(config.transport.clone()),
            config,
        }
    }

    /// Node configuration
    pub fn config(&self) -> &UmundoConfig {
        &self.config
    }

    /// Underlying transport
    pub fn transport(&self) -> &LoopbackTransport {
        &self.transport
    }

    /// Transport metrics
    pub fn metrics(&self) -> &TransportMetrics {
        self.transport.metrics()
    }

    /// Advertise a typed publisher on `channel`
    pub fn publisher(&self, channel: &str) -> Result<TypedPublisher> {
        Ok(TypedPublisher::new(&self.transport, channel)?)
    }

    /// Subscribe to `channel`
    ///
    /// The subscriber's registry follows the node's duplicate policy. Types
    /// must be registered explicitly.
    pub fn subscriber<M, R>(&self, channel: &str, receiver: R) -> Result<TypedSubscriber<M>>
    where
        M: 'static,
        R: TypedReceiver<M> + 'static,
    {
        let registry = TypeRegistry::from_config(&self.config.s11n);
        Ok(TypedSubscriber::with_registry(
            &self.transport,
            channel,
            registry,
            receiver,
        )?)
    }

    /// Subscribe to `channel` with a catalog of known types
    ///
    /// Unregistered tags are looked up in `catalog` when
    /// `s11n.auto_register_types` is enabled; it can also be switched on
    /// later through [`TypedSubscriber::registry`].
    pub fn subscriber_with_catalog<M, R>(
        &self,
        channel: &str,
        catalog: Arc<TypeCatalog<M>>,
        receiver: R,
    ) -> Result<TypedSubscriber<M>>
    where
        M: 'static,
        R: TypedReceiver<M> + 'static,
    {
        let registry = TypeRegistry::from_config(&self.config.s11n).with_catalog(catalog);
        Ok(TypedSubscriber::with_registry(
            &self.transport,
            channel,
            registry,
            receiver,
        )?)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

/// Node builder
///
/// Provides a fluent API over [`UmundoConfig`].
///
/// # Example
///
/// ```rust,no_run,ignore
/// let node = Node::builder()
///     .domain("lab")
///     .wire_encoding(true)
///     .auto_register_types(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct NodeBuilder {
    config: UmundoConfig,
}

impl NodeBuilder {
    /// Create a builder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: UmundoConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the domain name
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.config.transport.domain = domain.into();
        self
    }

    /// Set the per-subscriber queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.transport.queue_capacity = capacity;
        self
    }

    /// Set the maximum payload size in bytes
    pub fn max_payload_size(mut self, size: usize) -> Self {
        self.config.transport.max_payload_size = size;
        self
    }

    /// Round-trip every message through the binary frame codec
    pub fn wire_encoding(mut self, enabled: bool) -> Self {
        self.config.transport.wire_encoding = enabled;
        self
    }

    /// Set how duplicate type registrations are handled
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.config.s11n.duplicate_policy = policy;
        self
    }

    /// Resolve unknown tags from a subscriber's catalog
    pub fn auto_register_types(mut self, enabled: bool) -> Self {
        self.config.s11n.auto_register_types = enabled;
        self
    }

    /// Validate the configuration and build the node
    pub fn build(self) -> Result<Node> {
        Node::with_config(self.config)
    }
}
