use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// 投递服务器订阅的频道名
pub const DISCUSSION_EVENTS_CHANNEL: &str = "discussion_events";

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("publish failed: {0}")]
    Publish(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("publish timed out after {0:?}")]
    Timeout(Duration),
}

impl ChannelError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn publish(message: impl Into<String>) -> Self {
        Self::Publish(message.into())
    }
}

/// 发布订阅频道
///
/// 实现必须可以在多个任务之间共享，整个进程只持有一个实例。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// 发布一条已序列化的消息，返回收到消息的订阅者数量
    async fn publish(&self, channel: &str, payload: String) -> Result<u32, ChannelError>;
}

/// 单次发布的结果。发布只尝试一次，失败的事件直接丢弃
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published { receivers: u32 },
    Dropped,
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}
