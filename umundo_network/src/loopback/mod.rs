//! 进程内传输
//!
//! 原始发布/订阅接口的进程内实现。每个订阅拥有一个有界队列和独立的
//! 投递任务，接收回调在与发送方无关的任务中执行。

mod metrics;
mod publisher;
mod registry;
mod subscription;
mod transport;

pub use metrics::TransportMetrics;
pub use publisher::LoopbackPublisher;
pub use subscription::LoopbackSubscription;
pub use transport::LoopbackTransport;
