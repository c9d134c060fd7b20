use async_trait::async_trait;

use crate::entities::{Community, CommunityArticle, CommunityRole};
use crate::errors::RepositoryResult;
use crate::value_objects::{ArticleId, CommunityId, UserId};

/// 社区与成员角色的只读仓储
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait CommunityRepository: Send + Sync {
    /// 查找文章在某个社区中的投稿记录
    async fn find_community_article(
        &self,
        article_id: ArticleId,
        community_id: CommunityId,
    ) -> RepositoryResult<Option<CommunityArticle>>;

    /// 列出用户以指定角色所在的全部社区
    async fn communities_with_role(
        &self,
        user_id: UserId,
        role: CommunityRole,
    ) -> RepositoryResult<Vec<Community>>;

    /// 用户在某个社区中拥有的角色
    async fn roles_in_community(
        &self,
        user_id: UserId,
        community_id: CommunityId,
    ) -> RepositoryResult<Vec<CommunityRole>>;
}
