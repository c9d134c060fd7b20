//! 讨论与评论实体定义

use serde::{Deserialize, Serialize};

use crate::entities::user::UserSummary;
use crate::value_objects::{ArticleId, CommentId, CommunityId, DiscussionId, Timestamp};

/// 文章下的讨论
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: DiscussionId,
    pub article_id: ArticleId,
    pub community_id: Option<CommunityId>,
    pub author: UserSummary,
    pub topic: String,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
    /// 作者在该文章/社区下的化名
    pub anonymous_name: Option<String>,
    pub avatar: Option<String>,
}

/// 讨论下的评论，`parent_id` 指向被回复的评论
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionComment {
    pub id: CommentId,
    pub discussion_id: DiscussionId,
    pub article_id: ArticleId,
    pub community_id: Option<CommunityId>,
    pub author: UserSummary,
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub created_at: Timestamp,
    pub upvotes: i64,
    pub anonymous_name: Option<String>,
    pub avatar: Option<String>,
}

impl DiscussionComment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// 评论在回复链中的位置，每次推送时重新计算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyMetadata {
    /// 沿 parent 链走到根评论经过的链接数
    pub reply_depth: u32,
    pub parent_id: Option<CommentId>,
    pub is_reply: bool,
}

impl ReplyMetadata {
    pub fn root() -> Self {
        Self {
            reply_depth: 0,
            parent_id: None,
            is_reply: false,
        }
    }

    pub fn reply(parent_id: CommentId, reply_depth: u32) -> Self {
        Self {
            reply_depth,
            parent_id: Some(parent_id),
            is_reply: true,
        }
    }
}

impl Default for ReplyMetadata {
    fn default() -> Self {
        Self::root()
    }
}
