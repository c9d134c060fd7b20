//! 基础设施层实现。
//!
//! 提供 Redis 事件频道、投递服务器 HTTP 客户端、PostgreSQL 与内存仓储等适配器，
//! 实现应用/领域层定义的接口。

pub mod builder;
pub mod delivery_client;
pub mod memory;
pub mod redis;
pub mod repository;

pub use builder::{Infrastructure, InfrastructureError};
pub use delivery_client::HttpQueueClient;
pub use memory::InMemoryStore;
pub use redis::{RedisError, RedisEventChannel, RedisResult};
pub use repository::{
    create_pg_pool, PgCommunityRepository, PgDiscussionRepository, PgStorage,
    PgSubscriptionRepository,
};
