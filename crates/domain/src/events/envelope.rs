//! 事件信封
//!
//! 频道上的消息格式：
//! `{type, data, community_ids, exclude_user_id, timestamp, event_id}`。
//! `timestamp` 和 `event_id` 由投递服务器在扇出前写入，发布端始终为 null。

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::events::payload::{
    CommentDeletedPayload, CommentPayload, DiscussionDeletedPayload, DiscussionPayload,
};
use crate::value_objects::{CommunityId, Timestamp, UserId};

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealtimeEventKind {
    NewDiscussion,
    NewComment,
    UpdatedDiscussion,
    UpdatedComment,
    DeletedDiscussion,
    DeletedComment,
}

impl RealtimeEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewDiscussion => "new_discussion",
            Self::NewComment => "new_comment",
            Self::UpdatedDiscussion => "updated_discussion",
            Self::UpdatedComment => "updated_comment",
            Self::DeletedDiscussion => "deleted_discussion",
            Self::DeletedComment => "deleted_comment",
        }
    }
}

impl fmt::Display for RealtimeEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 推送事件，每种类型携带自己的强类型载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RealtimeEvent {
    #[serde(rename = "new_discussion")]
    DiscussionCreated(DiscussionPayload),
    #[serde(rename = "new_comment")]
    CommentCreated(CommentPayload),
    #[serde(rename = "updated_discussion")]
    DiscussionUpdated(DiscussionPayload),
    #[serde(rename = "updated_comment")]
    CommentUpdated(CommentPayload),
    #[serde(rename = "deleted_discussion")]
    DiscussionDeleted(DiscussionDeletedPayload),
    #[serde(rename = "deleted_comment")]
    CommentDeleted(CommentDeletedPayload),
}

impl RealtimeEvent {
    pub fn kind(&self) -> RealtimeEventKind {
        match self {
            Self::DiscussionCreated(_) => RealtimeEventKind::NewDiscussion,
            Self::CommentCreated(_) => RealtimeEventKind::NewComment,
            Self::DiscussionUpdated(_) => RealtimeEventKind::UpdatedDiscussion,
            Self::CommentUpdated(_) => RealtimeEventKind::UpdatedComment,
            Self::DiscussionDeleted(_) => RealtimeEventKind::DeletedDiscussion,
            Self::CommentDeleted(_) => RealtimeEventKind::DeletedComment,
        }
    }

    /// 事件携带的显式订阅者列表
    pub fn subscriber_ids(&self) -> Option<&[UserId]> {
        match self {
            Self::DiscussionCreated(payload) | Self::DiscussionUpdated(payload) => {
                payload.subscriber_ids.as_deref()
            }
            Self::CommentCreated(payload) | Self::CommentUpdated(payload) => {
                payload.subscriber_ids.as_deref()
            }
            Self::DiscussionDeleted(_) | Self::CommentDeleted(_) => None,
        }
    }
}

/// 发布到频道上的事件信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(flatten)]
    event: RealtimeEvent,
    community_ids: BTreeSet<CommunityId>,
    exclude_user_id: Option<UserId>,
    timestamp: Option<Timestamp>,
    event_id: Option<u64>,
}

impl EventEnvelope {
    pub fn new(
        event: RealtimeEvent,
        community_ids: BTreeSet<CommunityId>,
        exclude_user_id: Option<UserId>,
    ) -> Self {
        Self {
            event,
            community_ids,
            exclude_user_id,
            timestamp: None,
            event_id: None,
        }
    }

    pub fn kind(&self) -> RealtimeEventKind {
        self.event.kind()
    }

    pub fn event(&self) -> &RealtimeEvent {
        &self.event
    }

    pub fn community_ids(&self) -> &BTreeSet<CommunityId> {
        &self.community_ids
    }

    pub fn exclude_user_id(&self) -> Option<UserId> {
        self.exclude_user_id
    }

    /// 投递服务器写入的时间戳
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    /// 投递服务器写入的事件序号
    pub fn event_id(&self) -> Option<u64> {
        self.event_id
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
