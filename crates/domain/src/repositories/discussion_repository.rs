use async_trait::async_trait;

use crate::entities::DiscussionComment;
use crate::errors::RepositoryResult;
use crate::value_objects::{CommentId, DiscussionId};

/// 讨论与评论的只读仓储
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait DiscussionRepository: Send + Sync {
    async fn find_comment(&self, id: CommentId) -> RepositoryResult<Option<DiscussionComment>>;

    /// 直接回复该评论的评论，按创建时间排序
    async fn list_replies(&self, parent_id: CommentId) -> RepositoryResult<Vec<DiscussionComment>>;

    async fn count_comments(&self, discussion_id: DiscussionId) -> RepositoryResult<i64>;
}
