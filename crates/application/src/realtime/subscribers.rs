use std::{collections::BTreeSet, sync::Arc};

use domain::{
    CommunityArticle, CommunityId, CommunityRepository, CommunityRole, RepositoryResult,
    SubscriptionRepository, UserId,
};
use tracing::warn;

/// 订阅者解析器
///
/// 计算某个社区文章的讨论/评论通知应该发给哪些用户。
/// 数据访问全部通过注入的仓储完成，本身不持有状态。
pub struct SubscriberResolver {
    communities: Arc<dyn CommunityRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl SubscriberResolver {
    pub fn new(
        communities: Arc<dyn CommunityRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            communities,
            subscriptions,
        }
    }

    /// 对该社区文章有有效订阅的全部用户，查询失败时返回空集合
    pub async fn get_discussion_subscribers(
        &self,
        community_article: &CommunityArticle,
        community_id: CommunityId,
    ) -> BTreeSet<UserId> {
        match self
            .subscriptions
            .active_subscriber_ids(community_article.id, community_id)
            .await
        {
            Ok(ids) => ids.into_iter().collect(),
            Err(err) => {
                warn!(
                    community_article_id = %community_article.id,
                    community_id = %community_id,
                    error = %err,
                    "failed to resolve discussion subscribers"
                );
                BTreeSet::new()
            }
        }
    }

    /// 评论通知的订阅者。
    ///
    /// 所有有效订阅者都会收到顶层评论和回复，`include_reply_notifications`
    /// 目前不会缩小结果，只为保持接口稳定而保留。
    pub async fn get_comment_subscribers(
        &self,
        community_article: &CommunityArticle,
        community_id: CommunityId,
        _include_reply_notifications: bool,
    ) -> BTreeSet<UserId> {
        self.get_discussion_subscribers(community_article, community_id)
            .await
    }

    /// 用户可接收实时推送的社区：成员/管理员/版主/审稿人所在的私有社区，
    /// 加上用户有有效订阅的私有社区
    pub async fn get_user_community_ids(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<BTreeSet<CommunityId>> {
        let mut community_ids = BTreeSet::new();

        for role in CommunityRole::ALL {
            let communities = self.communities.communities_with_role(user_id, role).await?;
            community_ids.extend(
                communities
                    .into_iter()
                    .filter(|community| community.supports_realtime())
                    .map(|community| community.id),
            );
        }

        let subscribed = self.subscriptions.subscribed_communities(user_id).await?;
        community_ids.extend(
            subscribed
                .into_iter()
                .filter(|community| community.supports_realtime())
                .map(|community| community.id),
        );

        Ok(community_ids)
    }

    /// 判断用户是否应该收到某个社区的事件。
    ///
    /// 提供了 `subscriber_ids` 时只看是否在列表中，不会再按社区角色放宽；
    /// 未提供时按成员/管理员/版主身份判断。查询出错一律返回 false。
    pub async fn should_user_receive_event(
        &self,
        user_id: UserId,
        community_id: CommunityId,
        subscriber_ids: Option<&BTreeSet<UserId>>,
    ) -> bool {
        if let Some(subscriber_ids) = subscriber_ids {
            return subscriber_ids.contains(&user_id);
        }

        match self
            .communities
            .roles_in_community(user_id, community_id)
            .await
        {
            Ok(roles) => roles.iter().any(CommunityRole::receives_community_events),
            Err(err) => {
                warn!(
                    user_id = %user_id,
                    community_id = %community_id,
                    error = %err,
                    "failed to check community membership"
                );
                false
            }
        }
    }
}
