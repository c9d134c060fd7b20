use std::sync::Arc;

use application::{
    EventChannel, PublisherDependencies, QueueLifecycle, RealtimeEventPublisher, RealtimeService,
    RealtimeServiceDependencies, SubscriberResolver,
};
use config::AppConfig;
use domain::{CommunityRepository, DiscussionRepository, SubscriptionRepository};
use thiserror::Error;
use tracing::info;

use crate::{
    delivery_client::HttpQueueClient,
    memory::InMemoryStore,
    redis::{RedisError, RedisEventChannel},
    repository::{create_pg_pool, PgStorage},
};

#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("redis error: {0}")]
    Redis(#[from] RedisError),
}

/// 组装好的适配器集合
#[derive(Clone)]
pub struct Infrastructure {
    pub community_repository: Arc<dyn CommunityRepository>,
    pub subscription_repository: Arc<dyn SubscriptionRepository>,
    pub discussion_repository: Arc<dyn DiscussionRepository>,
    pub channel: Arc<dyn EventChannel>,
    pub queues: Arc<dyn QueueLifecycle>,
    channel_name: String,
    stream_path: String,
}

impl Infrastructure {
    /// 配置了数据库时使用 PostgreSQL，否则退回到空的内存仓储
    pub async fn connect(config: &AppConfig) -> Result<Self, InfrastructureError> {
        let channel = Arc::new(RedisEventChannel::new(
            &config.realtime.redis_url,
            config.realtime.publish_timeout(),
        )?);
        let queues = Arc::new(HttpQueueClient::new(&config.realtime));

        let Some(database) = &config.database else {
            info!("no database configured, using in-memory repositories");
            return Ok(Self::from_store(config, Arc::new(InMemoryStore::new()), channel, queues));
        };

        let pool = create_pg_pool(&database.url, database.max_connections).await?;
        let storage = PgStorage::new(pool);
        info!("connected to PostgreSQL");

        Ok(Self {
            community_repository: storage.community_repository,
            subscription_repository: storage.subscription_repository,
            discussion_repository: storage.discussion_repository,
            channel,
            queues,
            channel_name: config.realtime.channel.clone(),
            stream_path: config.realtime.stream_path.clone(),
        })
    }

    /// 以同一个内存仓储提供三种仓储接口
    pub fn from_store(
        config: &AppConfig,
        store: Arc<InMemoryStore>,
        channel: Arc<dyn EventChannel>,
        queues: Arc<dyn QueueLifecycle>,
    ) -> Self {
        Self {
            community_repository: store.clone(),
            subscription_repository: store.clone(),
            discussion_repository: store,
            channel,
            queues,
            channel_name: config.realtime.channel.clone(),
            stream_path: config.realtime.stream_path.clone(),
        }
    }

    pub fn subscriber_resolver(&self) -> Arc<SubscriberResolver> {
        Arc::new(SubscriberResolver::new(
            self.community_repository.clone(),
            self.subscription_repository.clone(),
        ))
    }

    pub fn event_publisher(&self) -> RealtimeEventPublisher {
        RealtimeEventPublisher::new(PublisherDependencies {
            channel: self.channel.clone(),
            channel_name: self.channel_name.clone(),
            resolver: self.subscriber_resolver(),
            community_repository: self.community_repository.clone(),
            discussion_repository: self.discussion_repository.clone(),
        })
    }

    pub fn realtime_service(&self) -> RealtimeService {
        RealtimeService::new(RealtimeServiceDependencies {
            resolver: self.subscriber_resolver(),
            queues: self.queues.clone(),
            stream_path: self.stream_path.clone(),
        })
    }
}
