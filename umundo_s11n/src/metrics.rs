//! 订阅者指标

use crate::error::S11nError;
use std::sync::atomic::{AtomicU64, Ordering};

/// 订阅者分发指标
#[derive(Debug, Default)]
pub struct SubscriberMetrics {
    /// 成功解码并交给接收者的消息数
    delivered: AtomicU64,
    /// 标签无法解析的消息数
    unknown_type: AtomicU64,
    /// 缺少标签的消息数
    missing_tag: AtomicU64,
    /// 解码失败的消息数
    decode_failed: AtomicU64,
    /// 注册表等内部故障导致丢弃的消息数
    internal: AtomicU64,
}

impl SubscriberMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// 按错误类别记录一次失败
    pub fn record_failure(&self, err: &S11nError) {
        let counter = match err {
            S11nError::UnknownType(_) => &self.unknown_type,
            S11nError::MissingTypeTag => &self.missing_tag,
            S11nError::Decode { .. } => &self.decode_failed,
            S11nError::Registry(_)
            | S11nError::Encode { .. }
            | S11nError::DuplicateRegistration(_)
            | S11nError::EmptyTypeTag
            | S11nError::Transport(_) => &self.internal,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn unknown_type(&self) -> u64 {
        self.unknown_type.load(Ordering::Relaxed)
    }

    pub fn missing_tag(&self) -> u64 {
        self.missing_tag.load(Ordering::Relaxed)
    }

    pub fn decode_failed(&self) -> u64 {
        self.decode_failed.load(Ordering::Relaxed)
    }

    pub fn internal(&self) -> u64 {
        self.internal.load(Ordering::Relaxed)
    }

    /// 全部失败数
    pub fn failures(&self) -> u64 {
        self.unknown_type() + self.missing_tag() + self.decode_failed() + self.internal()
    }

    /// 生成摘要报告
    pub fn summary(&self) -> String {
        format!(
            "Subscriber Metrics:\n\
             - Delivered: {}\n\
             - Unknown Type: {}\n\
             - Missing Tag: {}\n\
             - Decode Failed: {}\n\
             - Internal: {}",
            self.delivered(),
            self.unknown_type(),
            self.missing_tag(),
            self.decode_failed(),
            self.internal(),
        )
    }
}
