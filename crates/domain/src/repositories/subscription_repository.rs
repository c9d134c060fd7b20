use async_trait::async_trait;

use crate::entities::Community;
use crate::errors::RepositoryResult;
use crate::value_objects::{CommunityArticleId, CommunityId, UserId};

/// 讨论订阅的只读仓储，只返回 `is_active` 的订阅
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn active_subscriber_ids(
        &self,
        community_article_id: CommunityArticleId,
        community_id: CommunityId,
    ) -> RepositoryResult<Vec<UserId>>;

    /// 用户有有效订阅的社区（去重）
    async fn subscribed_communities(&self, user_id: UserId) -> RepositoryResult<Vec<Community>>;
}
