//! 投递队列的客户端句柄
//!
//! 队列本身由外部投递服务器持有并负责过期回收，这里只记录本进程视角下的状态：
//!
//! ```text
//! Unregistered --register--> Active --heartbeat ok--> Active
//!                              |
//!                              +--heartbeat 失败--> Expired --register--> Active(新 queue_id)
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{CommunityId, UserId};

/// 队列状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueState {
    Unregistered,
    Active,
    Expired,
}

/// 投递队列句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryQueue {
    user_id: UserId,
    queue_id: Option<String>,
    community_ids: BTreeSet<CommunityId>,
    state: QueueState,
}

impl DeliveryQueue {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            queue_id: None,
            community_ids: BTreeSet::new(),
            state: QueueState::Unregistered,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn queue_id(&self) -> Option<&str> {
        self.queue_id.as_deref()
    }

    pub fn community_ids(&self) -> &BTreeSet<CommunityId> {
        &self.community_ids
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == QueueState::Active
    }

    /// 注册成功：从 Unregistered 或 Expired 进入 Active
    pub fn registered(
        &mut self,
        queue_id: impl Into<String>,
        community_ids: BTreeSet<CommunityId>,
    ) -> DomainResult<()> {
        if self.state == QueueState::Active {
            return Err(DomainError::queue_state("queue is already active"));
        }
        self.queue_id = Some(queue_id.into());
        self.community_ids = community_ids;
        self.state = QueueState::Active;
        Ok(())
    }

    /// 心跳结果。失败意味着投递服务器已经回收了队列，必须重新注册
    pub fn heartbeat(&mut self, success: bool) -> DomainResult<()> {
        if self.state != QueueState::Active {
            return Err(DomainError::queue_state("heartbeat on inactive queue"));
        }
        if !success {
            self.state = QueueState::Expired;
        }
        Ok(())
    }

    /// 订阅更新不改变队列标识
    pub fn subscriptions_updated(&mut self, community_ids: BTreeSet<CommunityId>) -> DomainResult<()> {
        if self.state != QueueState::Active {
            return Err(DomainError::queue_state("subscription update on inactive queue"));
        }
        self.community_ids = community_ids;
        Ok(())
    }
}
