//! 应用层实现。
//!
//! 围绕领域模型提供实时推送的用例：订阅者解析、事件发布、
//! 投递队列生命周期，以及对外部适配器（发布订阅频道、投递服务器）的抽象。

pub mod dto;
pub mod error;
pub mod realtime;
pub mod services;

pub use dto::{RealtimeStatusDto, RegisterQueueDto};
pub use error::ApplicationError;
pub use realtime::{
    ChannelError, DeletedComment, EventChannel, EventCursor, PublishOutcome, PublisherDependencies,
    QueueLifecycle, QueueRegistration, QueueSession, RealtimeEventPublisher, SubscriberResolver,
    DISCUSSION_EVENTS_CHANNEL,
};
pub use services::{RealtimeService, RealtimeServiceDependencies};
