//! 内存仓储实现
//!
//! 未配置数据库时使用，也用于集成测试。

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use domain::{
    ArticleId, CommentId, Community, CommunityArticle, CommunityArticleId, CommunityId,
    CommunityRepository, CommunityRole, DiscussionComment, DiscussionId, DiscussionRepository,
    RepositoryResult, SubscriptionRepository, UserId,
};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SubscriptionKey {
    user_id: UserId,
    community_article_id: CommunityArticleId,
    community_id: CommunityId,
}

#[derive(Default)]
struct State {
    communities: BTreeMap<CommunityId, Community>,
    roles: HashMap<(UserId, CommunityId), BTreeSet<CommunityRole>>,
    community_articles: Vec<CommunityArticle>,
    // 值为 is_active
    subscriptions: HashMap<SubscriptionKey, bool>,
    comments: BTreeMap<CommentId, DiscussionComment>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_community(&self, community: Community) {
        self.state
            .write()
            .await
            .communities
            .insert(community.id, community);
    }

    pub async fn grant_role(&self, user_id: UserId, community_id: CommunityId, role: CommunityRole) {
        self.state
            .write()
            .await
            .roles
            .entry((user_id, community_id))
            .or_default()
            .insert(role);
    }

    pub async fn revoke_role(&self, user_id: UserId, community_id: CommunityId, role: CommunityRole) {
        if let Some(roles) = self.state.write().await.roles.get_mut(&(user_id, community_id)) {
            roles.remove(&role);
        }
    }

    pub async fn add_community_article(&self, community_article: CommunityArticle) {
        self.state
            .write()
            .await
            .community_articles
            .push(community_article);
    }

    /// 新增或重新激活订阅
    pub async fn subscribe(
        &self,
        user_id: UserId,
        community_article_id: CommunityArticleId,
        community_id: CommunityId,
    ) {
        self.set_subscription(user_id, community_article_id, community_id, true)
            .await;
    }

    /// 保留记录但标记为不活跃
    pub async fn unsubscribe(
        &self,
        user_id: UserId,
        community_article_id: CommunityArticleId,
        community_id: CommunityId,
    ) {
        self.set_subscription(user_id, community_article_id, community_id, false)
            .await;
    }

    pub async fn add_comment(&self, comment: DiscussionComment) {
        self.state.write().await.comments.insert(comment.id, comment);
    }

    async fn set_subscription(
        &self,
        user_id: UserId,
        community_article_id: CommunityArticleId,
        community_id: CommunityId,
        active: bool,
    ) {
        let key = SubscriptionKey {
            user_id,
            community_article_id,
            community_id,
        };
        self.state.write().await.subscriptions.insert(key, active);
    }
}

#[async_trait]
impl CommunityRepository for InMemoryStore {
    async fn find_community_article(
        &self,
        article_id: ArticleId,
        community_id: CommunityId,
    ) -> RepositoryResult<Option<CommunityArticle>> {
        let state = self.state.read().await;
        Ok(state
            .community_articles
            .iter()
            .find(|ca| ca.article_id == article_id && ca.community_id == community_id)
            .copied())
    }

    async fn communities_with_role(
        &self,
        user_id: UserId,
        role: CommunityRole,
    ) -> RepositoryResult<Vec<Community>> {
        let state = self.state.read().await;
        Ok(state
            .communities
            .values()
            .filter(|community| {
                state
                    .roles
                    .get(&(user_id, community.id))
                    .is_some_and(|roles| roles.contains(&role))
            })
            .cloned()
            .collect())
    }

    async fn roles_in_community(
        &self,
        user_id: UserId,
        community_id: CommunityId,
    ) -> RepositoryResult<Vec<CommunityRole>> {
        let state = self.state.read().await;
        Ok(state
            .roles
            .get(&(user_id, community_id))
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn active_subscriber_ids(
        &self,
        community_article_id: CommunityArticleId,
        community_id: CommunityId,
    ) -> RepositoryResult<Vec<UserId>> {
        let state = self.state.read().await;
        let ids: BTreeSet<UserId> = state
            .subscriptions
            .iter()
            .filter(|(key, active)| {
                **active
                    && key.community_article_id == community_article_id
                    && key.community_id == community_id
            })
            .map(|(key, _)| key.user_id)
            .collect();

        Ok(ids.into_iter().collect())
    }

    async fn subscribed_communities(&self, user_id: UserId) -> RepositoryResult<Vec<Community>> {
        let state = self.state.read().await;
        let ids: BTreeSet<CommunityId> = state
            .subscriptions
            .iter()
            .filter(|(key, active)| **active && key.user_id == user_id)
            .map(|(key, _)| key.community_id)
            .collect();

        Ok(ids
            .into_iter()
            .filter_map(|id| state.communities.get(&id).cloned())
            .collect())
    }
}

#[async_trait]
impl DiscussionRepository for InMemoryStore {
    async fn find_comment(&self, id: CommentId) -> RepositoryResult<Option<DiscussionComment>> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn list_replies(&self, parent_id: CommentId) -> RepositoryResult<Vec<DiscussionComment>> {
        let state = self.state.read().await;
        let mut replies: Vec<DiscussionComment> = state
            .comments
            .values()
            .filter(|comment| comment.parent_id == Some(parent_id))
            .cloned()
            .collect();
        replies.sort_by_key(|comment| (comment.created_at, comment.id));
        Ok(replies)
    }

    async fn count_comments(&self, discussion_id: DiscussionId) -> RepositoryResult<i64> {
        let state = self.state.read().await;
        let count = state
            .comments
            .values()
            .filter(|comment| comment.discussion_id == discussion_id)
            .count();
        Ok(count as i64)
    }
}
