//! 端点标识
//!
//! 为发布者和订阅者分配进程内唯一的标识。

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// 发布者或订阅者的唯一标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(u64);

impl PeerId {
    /// 创建新的标识
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// 获取内部值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// 标识生成器
#[derive(Debug)]
pub struct PeerIdGenerator {
    next_id: AtomicU64,
}

impl PeerIdGenerator {
    /// 创建新的生成器
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    /// 生成下一个标识
    pub fn next(&self) -> PeerId {
        PeerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for PeerIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
