use std::{collections::BTreeSet, sync::Arc};

use domain::{CommunityId, DeliveryQueue, QueueState, UserId};
use tracing::{info, warn};

use super::queue::{EventCursor, QueueLifecycle};

/// 驱动单个用户的投递队列。
///
/// 心跳失败后队列进入 Expired，下一次 `ensure_registered` 会重新注册并拿到新的 queue_id。
pub struct QueueSession {
    lifecycle: Arc<dyn QueueLifecycle>,
    queue: DeliveryQueue,
    last_event_id: Option<EventCursor>,
}

impl QueueSession {
    pub fn new(lifecycle: Arc<dyn QueueLifecycle>, user_id: UserId) -> Self {
        Self {
            lifecycle,
            queue: DeliveryQueue::new(user_id),
            last_event_id: None,
        }
    }

    pub fn queue(&self) -> &DeliveryQueue {
        &self.queue
    }

    /// 最近一次注册返回的事件游标
    pub fn last_event_id(&self) -> Option<&EventCursor> {
        self.last_event_id.as_ref()
    }

    /// 确保存在一个活动队列，返回其 queue_id；投递服务器不可用时返回 None
    pub async fn ensure_registered(
        &mut self,
        community_ids: BTreeSet<CommunityId>,
    ) -> Option<String> {
        if self.queue.is_active() {
            return self.queue.queue_id().map(str::to_string);
        }

        let ids: Vec<CommunityId> = community_ids.iter().copied().collect();
        let registration = self
            .lifecycle
            .register_user_queue(self.queue.user_id(), &ids)
            .await?;

        if let Err(err) = self
            .queue
            .registered(registration.queue_id.clone(), community_ids)
        {
            warn!(user_id = %self.queue.user_id(), error = %err, "unexpected queue state");
            return None;
        }
        info!(
            user_id = %self.queue.user_id(),
            queue_id = %registration.queue_id,
            "delivery queue registered"
        );
        self.last_event_id = Some(registration.last_event_id);
        Some(registration.queue_id)
    }

    /// 发送心跳，失败时队列转为 Expired。没有活动队列时不发请求
    pub async fn heartbeat(&mut self) -> bool {
        let Some(queue_id) = self.active_queue_id() else {
            return false;
        };

        let alive = self.lifecycle.send_heartbeat(&queue_id).await;
        if self.queue.heartbeat(alive).is_err() {
            return false;
        }
        if !alive {
            warn!(user_id = %self.queue.user_id(), queue_id = %queue_id, "delivery queue expired");
        }
        alive
    }

    /// 替换队列订阅的社区集合，queue_id 保持不变
    pub async fn update_subscriptions(&mut self, community_ids: BTreeSet<CommunityId>) -> bool {
        if self.active_queue_id().is_none() {
            return false;
        }

        let ids: Vec<CommunityId> = community_ids.iter().copied().collect();
        let updated = self
            .lifecycle
            .update_user_subscriptions(self.queue.user_id(), &ids)
            .await;

        updated && self.queue.subscriptions_updated(community_ids).is_ok()
    }

    fn active_queue_id(&self) -> Option<String> {
        match self.queue.state() {
            QueueState::Active => self.queue.queue_id().map(str::to_string),
            QueueState::Unregistered | QueueState::Expired => None,
        }
    }
}
