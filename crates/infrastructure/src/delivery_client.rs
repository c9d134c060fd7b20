//! 投递服务器 HTTP 客户端
//!
//! 注册、心跳、订阅更新三个接口，每个请求都有独立的超时，失败不重试。

use std::time::Duration;

use application::{QueueLifecycle, QueueRegistration};
use async_trait::async_trait;
use config::RealtimeConfig;
use domain::{CommunityId, UserId};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, error, info, warn};

#[derive(Debug, Serialize)]
struct MembershipRequest<'a> {
    user_id: UserId,
    community_ids: &'a [CommunityId],
}

#[derive(Debug, Serialize)]
struct HeartbeatRequest<'a> {
    queue_id: &'a str,
}

/// 投递服务器队列生命周期客户端
#[derive(Clone)]
pub struct HttpQueueClient {
    http: Client,
    register_url: String,
    heartbeat_url: String,
    update_url: String,
    register_timeout: Duration,
    heartbeat_timeout: Duration,
    update_timeout: Duration,
}

impl HttpQueueClient {
    pub fn new(config: &RealtimeConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: &RealtimeConfig) -> Self {
        Self {
            http,
            register_url: config.endpoint("register"),
            heartbeat_url: config.endpoint("heartbeat"),
            update_url: config.endpoint("update-subscriptions"),
            register_timeout: config.register_timeout(),
            heartbeat_timeout: config.heartbeat_timeout(),
            update_timeout: config.update_timeout(),
        }
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        timeout: Duration,
    ) -> reqwest::Result<reqwest::Response> {
        self.http.post(url).json(body).timeout(timeout).send().await
    }
}

#[async_trait]
impl QueueLifecycle for HttpQueueClient {
    async fn register_user_queue(
        &self,
        user_id: UserId,
        community_ids: &[CommunityId],
    ) -> Option<QueueRegistration> {
        let request = MembershipRequest {
            user_id,
            community_ids,
        };

        let response = match self
            .post(&self.register_url, &request, self.register_timeout)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!(user_id = %user_id, error = %err, "error registering queue");
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(user_id = %user_id, %status, body = %body, "failed to register queue");
            return None;
        }

        match response.json::<QueueRegistration>().await {
            Ok(registration) => {
                info!(
                    user_id = %user_id,
                    queue_id = %registration.queue_id,
                    last_event_id = %registration.last_event_id,
                    "queue registered with delivery server"
                );
                Some(registration)
            }
            Err(err) => {
                error!(user_id = %user_id, error = %err, "invalid register response");
                None
            }
        }
    }

    async fn send_heartbeat(&self, queue_id: &str) -> bool {
        let request = HeartbeatRequest { queue_id };

        match self
            .post(&self.heartbeat_url, &request, self.heartbeat_timeout)
            .await
        {
            Ok(response) if response.status() == StatusCode::OK => {
                debug!(queue_id, "heartbeat accepted");
                true
            }
            Ok(response) => {
                warn!(queue_id, status = %response.status(), "heartbeat rejected");
                false
            }
            Err(err) => {
                error!(queue_id, error = %err, "error sending heartbeat");
                false
            }
        }
    }

    async fn update_user_subscriptions(
        &self,
        user_id: UserId,
        community_ids: &[CommunityId],
    ) -> bool {
        let request = MembershipRequest {
            user_id,
            community_ids,
        };

        match self
            .post(&self.update_url, &request, self.update_timeout)
            .await
        {
            Ok(response) if response.status() == StatusCode::OK => {
                debug!(user_id = %user_id, community_ids = ?community_ids, "subscriptions updated");
                true
            }
            Ok(response) => {
                warn!(user_id = %user_id, status = %response.status(), "subscription update rejected");
                false
            }
            Err(err) => {
                error!(user_id = %user_id, error = %err, "error updating subscriptions");
                false
            }
        }
    }
}
