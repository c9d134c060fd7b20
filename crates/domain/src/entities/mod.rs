//! 领域实体定义
//!
//! 包含实时推送涉及的核心实体：用户、社区、讨论、评论，以及投递队列句柄。

pub mod community;
pub mod discussion;
pub mod queue;
pub mod user;

// 重新导出核心实体
pub use community::{Community, CommunityArticle, CommunityRole, CommunityVisibility};
pub use discussion::{Discussion, DiscussionComment, ReplyMetadata};
pub use queue::{DeliveryQueue, QueueState};
pub use user::UserSummary;
