//! Redis 事件频道
//!
//! 整个进程共享一个 `ConnectionManager`，在第一次发布时才建立连接。
//! 连接失败不会被缓存，下一次发布会重新尝试。

use std::time::Duration;

use application::{ChannelError, EventChannel};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::redis::{RedisError, RedisResult};

/// 基于 Redis PUBLISH 的事件频道
pub struct RedisEventChannel {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    publish_timeout: Duration,
}

impl RedisEventChannel {
    /// 只校验地址，不建立连接
    pub fn new(redis_url: &str, publish_timeout: Duration) -> RedisResult<Self> {
        let client = Client::open(redis_url).map_err(|e| RedisError::ConfigError {
            message: format!("创建 Redis 客户端失败: {}", e),
        })?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            publish_timeout,
        })
    }

    async fn connection(&self) -> RedisResult<ConnectionManager> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let manager = self.client.get_connection_manager().await?;
                info!("Redis 事件频道连接已建立");
                Ok::<_, RedisError>(manager)
            })
            .await?;

        Ok(manager.clone())
    }

    /// 发布一条消息，返回收到消息的订阅者数量
    pub async fn publish_payload(&self, channel: &str, payload: &str) -> RedisResult<u32> {
        let mut connection = self.connection().await?;
        let receivers: u32 = connection.publish(channel, payload).await?;
        debug!(channel, receivers, "发布消息到频道成功");
        Ok(receivers)
    }
}

#[async_trait]
impl EventChannel for RedisEventChannel {
    async fn publish(&self, channel: &str, payload: String) -> Result<u32, ChannelError> {
        match tokio::time::timeout(self.publish_timeout, self.publish_payload(channel, &payload))
            .await
        {
            Ok(result) => result.map_err(ChannelError::from),
            Err(_) => Err(RedisError::TimeoutError {
                operation: "publish",
                timeout: self.publish_timeout,
            }
            .into()),
        }
    }
}
