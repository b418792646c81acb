//! 配置管理系统
//!
//! 提供传输层和序列化层的配置，支持 TOML 文件和环境变量覆盖。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析配置文件失败: {0}")]
    Parse(String),

    /// 验证错误
    #[error("配置验证失败: {0}")]
    Validation(String),

    /// 环境变量错误
    #[error("环境变量解析失败: {0}")]
    EnvVar(String),
}

/// 配置 Result 类型
pub type Result<T> = std::result::Result<T, ConfigError>;

/// 单条消息负载的硬上限（256MB）
pub const MAX_PAYLOAD_LIMIT: usize = 256 * 1024 * 1024;

/// 重复注册类型标签时的处理策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// 后注册的覆盖先注册的
    #[default]
    Overwrite,
    /// 拒绝重复注册
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(DuplicatePolicy::Overwrite),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(ConfigError::Parse(format!(
                "未知的重复注册策略: {} (可选 overwrite / reject)",
                other
            ))),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::Overwrite => write!(f, "overwrite"),
            DuplicatePolicy::Reject => write!(f, "reject"),
        }
    }
}

/// 传输层配置
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// 发现域名称，同一域内的节点互相可见
    #[serde(default = "default_domain")]
    pub domain: String,

    /// 每个订阅者的接收队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 单条消息负载的最大字节数
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,

    /// 投递前是否经过二进制帧编解码
    #[serde(default)]
    pub wire_encoding: bool,
}

/// 序列化层配置
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S11nConfig {
    /// 重复注册策略
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// 未注册的类型标签是否从类型目录中自动注册
    #[serde(default)]
    pub auto_register_types: bool,
}

/// uMundo 完整配置
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UmundoConfig {
    /// 传输层配置
    #[serde(default)]
    pub transport: TransportConfig,

    /// 序列化层配置
    #[serde(default)]
    pub s11n: S11nConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            queue_capacity: default_queue_capacity(),
            max_payload_size: default_max_payload_size(),
            wire_encoding: false,
        }
    }
}

impl TransportConfig {
    /// 验证传输配置
    pub fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            return Err(ConfigError::Validation("发现域名称不能为空".to_string()));
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::Validation("接收队列容量不能为 0".to_string()));
        }

        if self.max_payload_size == 0 {
            return Err(ConfigError::Validation("最大负载不能为 0".to_string()));
        }
        if self.max_payload_size > MAX_PAYLOAD_LIMIT {
            return Err(ConfigError::Validation(format!(
                "最大负载过大: {} 字节 (上限 {} 字节)",
                self.max_payload_size, MAX_PAYLOAD_LIMIT
            )));
        }

        Ok(())
    }
}

impl UmundoConfig {
    /// 从 TOML 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 从环境变量加载配置并覆盖
    ///
    /// 支持的环境变量：
    /// - UMUNDO_DOMAIN: 发现域名称
    /// - UMUNDO_QUEUE_CAPACITY: 接收队列容量
    /// - UMUNDO_MAX_PAYLOAD_SIZE: 最大负载字节数
    /// - UMUNDO_WIRE_ENCODING: 是否经过帧编解码 (true/false)
    /// - UMUNDO_DUPLICATE_POLICY: 重复注册策略 (overwrite/reject)
    /// - UMUNDO_AUTO_REGISTER_TYPES: 是否自动注册类型 (true/false)
    pub fn load_with_env_override(self) -> Result<Self> {
        self.override_from(|key| std::env::var(key).ok())
    }

    /// 使用任意查找函数覆盖配置
    ///
    /// `lookup` 返回 `None` 表示该变量未设置。
    pub fn override_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(domain) = lookup("UMUNDO_DOMAIN") {
            self.transport.domain = domain;
        }

        if let Some(capacity) = lookup("UMUNDO_QUEUE_CAPACITY") {
            self.transport.queue_capacity = capacity.parse().map_err(|_| {
                ConfigError::EnvVar("UMUNDO_QUEUE_CAPACITY 必须是有效的 usize 数字".to_string())
            })?;
        }

        if let Some(size) = lookup("UMUNDO_MAX_PAYLOAD_SIZE") {
            self.transport.max_payload_size = size.parse().map_err(|_| {
                ConfigError::EnvVar("UMUNDO_MAX_PAYLOAD_SIZE 必须是有效的 usize 数字".to_string())
            })?;
        }

        if let Some(wire) = lookup("UMUNDO_WIRE_ENCODING") {
            self.transport.wire_encoding = wire.parse().map_err(|_| {
                ConfigError::EnvVar("UMUNDO_WIRE_ENCODING 必须是 true 或 false".to_string())
            })?;
        }

        if let Some(policy) = lookup("UMUNDO_DUPLICATE_POLICY") {
            self.s11n.duplicate_policy = policy
                .parse()
                .map_err(|e: ConfigError| ConfigError::EnvVar(format!("UMUNDO_DUPLICATE_POLICY: {}", e)))?;
        }

        if let Some(auto) = lookup("UMUNDO_AUTO_REGISTER_TYPES") {
            self.s11n.auto_register_types = auto.parse().map_err(|_| {
                ConfigError::EnvVar("UMUNDO_AUTO_REGISTER_TYPES 必须是 true 或 false".to_string())
            })?;
        }

        Ok(self)
    }

    /// 从文件加载并应用环境变量覆盖
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file(path)?.load_with_env_override()
    }

    /// 验证配置是否有效
    pub fn validate(&self) -> Result<()> {
        self.transport.validate()
    }

    /// 获取配置摘要信息
    pub fn summary(&self) -> String {
        format!(
            "uMundo 配置:\n  域: {}\n  队列容量: {}\n  最大负载: {} 字节\n  帧编码: {}\n  重复注册: {}\n  自动注册: {}",
            self.transport.domain,
            self.transport.queue_capacity,
            self.transport.max_payload_size,
            self.transport.wire_encoding,
            self.s11n.duplicate_policy,
            self.s11n.auto_register_types
        )
    }
}

// 默认值函数
fn default_domain() -> String {
    "default".to_string()
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_max_payload_size() -> usize {
    16 * 1024 * 1024
}
