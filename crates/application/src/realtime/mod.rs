//! 实时事件扇出核心
//!
//! - `channel`：发布订阅频道抽象
//! - `subscribers`：订阅者解析
//! - `publisher`：由领域对象构造事件并发布
//! - `queue`：与外部投递服务器之间的队列生命周期接口
//! - `session`：驱动单个投递队列的状态机

mod channel;
mod publisher;
mod queue;
mod session;
mod subscribers;

pub use channel::{ChannelError, EventChannel, PublishOutcome, DISCUSSION_EVENTS_CHANNEL};
pub use publisher::{
    DeletedComment, PublisherDependencies, RealtimeEventPublisher, MAX_REPLY_NESTING,
};
pub use queue::{EventCursor, QueueLifecycle, QueueRegistration};
pub use session::QueueSession;
pub use subscribers::SubscriberResolver;

#[cfg(test)]
pub use channel::MockEventChannel;
#[cfg(test)]
pub use queue::MockQueueLifecycle;
