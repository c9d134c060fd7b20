use std::fmt;

use async_trait::async_trait;
use domain::{CommunityId, UserId};
use serde::{Deserialize, Serialize};

/// 投递服务器返回的事件游标，原样透传给客户端
///
/// 当前服务器返回整数序号，同时接受字符串形式以兼容其它实现。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventCursor {
    Number(i64),
    Text(String),
}

impl Default for EventCursor {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl fmt::Display for EventCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// 注册成功后投递服务器分配的队列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRegistration {
    pub queue_id: String,
    pub last_event_id: EventCursor,
}

/// 与外部投递服务器之间的队列生命周期接口。
///
/// 所有方法都不返回错误：传输失败、超时和非 200 响应都折叠为 `None`/`false`，
/// 由实现负责记录日志。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueLifecycle: Send + Sync {
    async fn register_user_queue(
        &self,
        user_id: UserId,
        community_ids: &[CommunityId],
    ) -> Option<QueueRegistration>;

    async fn send_heartbeat(&self, queue_id: &str) -> bool;

    async fn update_user_subscriptions(
        &self,
        user_id: UserId,
        community_ids: &[CommunityId],
    ) -> bool;
}
