use std::sync::Arc;

use domain::{CommunityId, UserId};
use tracing::{debug, info, warn};

use crate::{
    dto::{RealtimeStatusDto, RegisterQueueDto},
    error::ApplicationError,
    realtime::{QueueLifecycle, QueueSession, SubscriberResolver},
};

pub struct RealtimeServiceDependencies {
    pub resolver: Arc<SubscriberResolver>,
    pub queues: Arc<dyn QueueLifecycle>,
    /// 客户端建立流式连接的相对路径
    pub stream_path: String,
}

/// 实时推送用例：注册队列、心跳、状态查询与订阅同步
pub struct RealtimeService {
    deps: RealtimeServiceDependencies,
}

impl RealtimeService {
    pub fn new(deps: RealtimeServiceDependencies) -> Self {
        Self { deps }
    }

    async fn qualifying_communities(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CommunityId>, ApplicationError> {
        let community_ids = self.deps.resolver.get_user_community_ids(user_id).await?;
        Ok(community_ids.into_iter().collect())
    }

    /// 为用户注册投递队列。没有任何可推送的社区时不会联系投递服务器
    pub async fn register(&self, user_id: UserId) -> Result<RegisterQueueDto, ApplicationError> {
        let (session, communities) = self.open_session(user_id).await?;
        let queue_id = session
            .queue()
            .queue_id()
            .map(str::to_string)
            .ok_or(ApplicationError::DeliveryUnavailable)?;

        info!(
            user_id = %user_id,
            queue_id = %queue_id,
            communities = ?communities,
            "realtime queue registered"
        );

        Ok(RegisterQueueDto {
            queue_id,
            last_event_id: session.last_event_id().cloned().unwrap_or_default(),
            communities,
        })
    }

    /// 为用户打开并注册一个队列会话。
    ///
    /// 需要自己维持心跳、过期后重新注册的服务端调用方直接持有返回的会话。
    pub async fn open_session(
        &self,
        user_id: UserId,
    ) -> Result<(QueueSession, Vec<CommunityId>), ApplicationError> {
        let communities = self.qualifying_communities(user_id).await?;
        if communities.is_empty() {
            debug!(user_id = %user_id, "user has no realtime communities");
            return Err(ApplicationError::NoQualifyingCommunities);
        }

        let mut session = QueueSession::new(self.deps.queues.clone(), user_id);
        session
            .ensure_registered(communities.iter().copied().collect())
            .await
            .ok_or(ApplicationError::DeliveryUnavailable)?;

        Ok((session, communities))
    }

    pub async fn heartbeat(&self, queue_id: &str) -> Result<(), ApplicationError> {
        if self.deps.queues.send_heartbeat(queue_id).await {
            debug!(queue_id, "heartbeat accepted");
            Ok(())
        } else {
            Err(ApplicationError::QueueNotFound)
        }
    }

    pub async fn status(&self, user_id: UserId) -> Result<RealtimeStatusDto, ApplicationError> {
        let communities = self.qualifying_communities(user_id).await?;

        Ok(RealtimeStatusDto {
            user_id,
            realtime_enabled: !communities.is_empty(),
            communities,
            tornado_url: self.deps.stream_path.clone(),
        })
    }

    /// 成员或订阅关系变化后调用，把最新的社区集合推给投递服务器。
    ///
    /// 返回投递服务器是否接受了更新；失败不影响调用方的写操作。
    pub async fn sync_user_subscriptions(&self, user_id: UserId) -> Result<bool, ApplicationError> {
        let communities = self.qualifying_communities(user_id).await?;
        let updated = self
            .deps
            .queues
            .update_user_subscriptions(user_id, &communities)
            .await;

        if !updated {
            warn!(user_id = %user_id, "delivery server rejected subscription update");
        }
        Ok(updated)
    }
}
