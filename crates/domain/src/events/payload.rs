//! 事件载荷
//!
//! 快照按匿名观看者构造，不包含任何与当前观看者相关的字段（`is_author` 恒为 false）。

use serde::{Deserialize, Serialize};

use crate::entities::{Discussion, DiscussionComment, ReplyMetadata, UserSummary};
use crate::value_objects::{
    ArticleId, CommentId, CommunityId, DiscussionId, Timestamp, UserId,
};

/// 讨论快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionSnapshot {
    pub id: DiscussionId,
    pub user: UserSummary,
    pub topic: String,
    pub article_id: ArticleId,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
    pub comments_count: i64,
    pub is_author: bool,
    pub anonymous_name: Option<String>,
    pub avatar: Option<String>,
}

impl DiscussionSnapshot {
    pub fn from_discussion(discussion: &Discussion, comments_count: i64) -> Self {
        Self {
            id: discussion.id,
            user: discussion.author.clone(),
            topic: discussion.topic.clone(),
            article_id: discussion.article_id,
            content: discussion.content.clone(),
            created_at: discussion.created_at,
            updated_at: discussion.updated_at,
            deleted_at: discussion.deleted_at,
            comments_count,
            is_author: false,
            anonymous_name: discussion.anonymous_name.clone(),
            avatar: discussion.avatar.clone(),
        }
    }
}

/// 评论快照，包含嵌套的回复
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentSnapshot {
    pub id: CommentId,
    pub author: UserSummary,
    pub content: String,
    pub created_at: Timestamp,
    pub upvotes: i64,
    pub replies: Vec<CommentSnapshot>,
    pub is_author: bool,
    pub anonymous_name: Option<String>,
    pub avatar: Option<String>,
}

impl CommentSnapshot {
    pub fn from_comment(comment: &DiscussionComment, replies: Vec<CommentSnapshot>) -> Self {
        Self {
            id: comment.id,
            author: comment.author.clone(),
            content: comment.content.clone(),
            created_at: comment.created_at,
            upvotes: comment.upvotes,
            replies,
            is_author: false,
            anonymous_name: comment.anonymous_name.clone(),
            avatar: comment.avatar.clone(),
        }
    }
}

/// `new_discussion` / `updated_discussion` 的载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionPayload {
    pub discussion: DiscussionSnapshot,
    pub article_id: ArticleId,
    pub community_id: Option<CommunityId>,
    /// 只有 new_discussion 携带
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_ids: Option<Vec<UserId>>,
}

/// `new_comment` / `updated_comment` 的载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentPayload {
    pub comment: CommentSnapshot,
    pub discussion_id: DiscussionId,
    pub article_id: ArticleId,
    pub community_id: Option<CommunityId>,
    pub parent_id: Option<CommentId>,
    pub is_reply: bool,
    pub reply_depth: u32,
    /// 只有 new_comment 携带
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_ids: Option<Vec<UserId>>,
}

impl CommentPayload {
    pub fn reply_metadata(&self) -> ReplyMetadata {
        ReplyMetadata {
            reply_depth: self.reply_depth,
            parent_id: self.parent_id,
            is_reply: self.is_reply,
        }
    }
}

/// `deleted_discussion` 的载荷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionDeletedPayload {
    pub discussion_id: DiscussionId,
    pub article_id: ArticleId,
}

/// `deleted_comment` 的载荷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDeletedPayload {
    pub comment_id: CommentId,
    pub discussion_id: DiscussionId,
    pub article_id: ArticleId,
    pub parent_id: Option<CommentId>,
    pub is_reply: bool,
    pub reply_depth: u32,
}
