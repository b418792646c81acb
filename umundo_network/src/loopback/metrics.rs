//! 传输指标
//!
//! 统计进程内传输的端点数量和消息流量。

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// 传输指标
#[derive(Debug, Default)]
pub struct TransportMetrics {
    /// 当前发布者数
    current_publishers: AtomicUsize,
    /// 当前订阅者数
    current_subscribers: AtomicUsize,
    /// 总发布消息数
    total_messages_published: AtomicU64,
    /// 总发布字节数
    total_bytes_published: AtomicU64,
    /// 总投递消息数（每个订阅者计一次）
    total_deliveries: AtomicU64,
    /// 因订阅者离开而丢弃的投递数
    total_dropped: AtomicU64,
}

impl TransportMetrics {
    /// 创建新的传输指标
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_publishers(&self) {
        self.current_publishers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec_publishers(&self) {
        self.current_publishers.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn inc_subscribers(&self) {
        self.current_subscribers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec_subscribers(&self) {
        self.current_subscribers.fetch_sub(1, Ordering::Relaxed);
    }

    /// 记录一次发布
    pub fn record_published(&self, bytes: usize) {
        self.total_messages_published.fetch_add(1, Ordering::Relaxed);
        self.total_bytes_published
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// 记录一次成功投递
    pub fn record_delivery(&self) {
        self.total_deliveries.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录一次丢弃的投递
    pub fn record_dropped(&self) {
        self.total_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn current_publishers(&self) -> usize {
        self.current_publishers.load(Ordering::Relaxed)
    }

    pub fn current_subscribers(&self) -> usize {
        self.current_subscribers.load(Ordering::Relaxed)
    }

    pub fn total_messages_published(&self) -> u64 {
        self.total_messages_published.load(Ordering::Relaxed)
    }

    pub fn total_bytes_published(&self) -> u64 {
        self.total_bytes_published.load(Ordering::Relaxed)
    }

    pub fn total_deliveries(&self) -> u64 {
        self.total_deliveries.load(Ordering::Relaxed)
    }

    pub fn total_dropped(&self) -> u64 {
        self.total_dropped.load(Ordering::Relaxed)
    }

    /// 生成摘要报告
    pub fn summary(&self) -> String {
        format!(
            "Transport Metrics:\n\
             - Publishers: {}\n\
             - Subscribers: {}\n\
             - Messages Published: {}\n\
             - Bytes Published: {}\n\
             - Deliveries: {}\n\
             - Dropped: {}",
            self.current_publishers(),
            self.current_subscribers(),
            self.total_messages_published(),
            self.total_bytes_published(),
            self.total_deliveries(),
            self.total_dropped(),
        )
    }
}
