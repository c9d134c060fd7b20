//! Repository接口定义
//!
//! 数据访问层的抽象接口：领域层定义接口，基础设施层实现接口。
//! 实时推送只读取这些数据，从不写入。

pub mod community_repository;
pub mod discussion_repository;
pub mod subscription_repository;

pub use community_repository::CommunityRepository;
pub use discussion_repository::DiscussionRepository;
pub use subscription_repository::SubscriptionRepository;

#[cfg(feature = "testing")]
pub use community_repository::MockCommunityRepository;
#[cfg(feature = "testing")]
pub use discussion_repository::MockDiscussionRepository;
#[cfg(feature = "testing")]
pub use subscription_repository::MockSubscriptionRepository;
