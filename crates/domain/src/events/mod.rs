//! 实时推送事件
//!
//! 写操作提交后由发布者构造事件，经发布订阅频道交给外部投递服务器扇出。

pub mod envelope;
pub mod payload;

pub use envelope::{EventEnvelope, RealtimeEvent, RealtimeEventKind};
pub use payload::{
    CommentDeletedPayload, CommentPayload, CommentSnapshot, DiscussionDeletedPayload,
    DiscussionPayload, DiscussionSnapshot,
};
