#![allow(dead_code)]

use std::{
    collections::{BTreeSet, HashMap},
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use application::{
    ChannelError, EventChannel, EventCursor, QueueLifecycle, QueueRegistration,
    RealtimeEventPublisher,
};
use async_trait::async_trait;
use config::{AppConfig, DeploymentEnvironment};
use domain::{
    ArticleId, Community, CommunityArticle, CommunityArticleId, CommunityId, CommunityRole,
    CommunityVisibility, UserId,
};
use infrastructure::{InMemoryStore, Infrastructure};
use tokio::{net::TcpListener, sync::oneshot};
use web_api::{router, AppState, JwtConfig, JwtService};

pub const JWT_SECRET: &str = "integration-test-secret-key-0123456789";

/// 记录调用次数的投递服务器替身
#[derive(Default)]
pub struct CountingQueueLifecycle {
    pub registrations: AtomicUsize,
    pub heartbeats: AtomicUsize,
    pub updates: AtomicUsize,
    /// 每次注册分配新的 queue_id；仍然存活的队列
    live_queues: Mutex<HashMap<String, UserId>>,
    pub last_update: Mutex<Option<(UserId, Vec<CommunityId>)>>,
    pub unavailable: bool,
}

impl CountingQueueLifecycle {
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// 模拟投递服务器回收队列
    pub fn expire(&self, queue_id: &str) {
        self.live_queues.lock().unwrap().remove(queue_id);
    }
}

#[async_trait]
impl QueueLifecycle for CountingQueueLifecycle {
    async fn register_user_queue(
        &self,
        user_id: UserId,
        _community_ids: &[CommunityId],
    ) -> Option<QueueRegistration> {
        let n = self.registrations.fetch_add(1, Ordering::SeqCst) + 1;
        if self.unavailable {
            return None;
        }

        let queue_id = format!("queue-{}-{n}", user_id);
        self.live_queues
            .lock()
            .unwrap()
            .insert(queue_id.clone(), user_id);
        Some(QueueRegistration {
            queue_id,
            last_event_id: EventCursor::Number(0),
        })
    }

    async fn send_heartbeat(&self, queue_id: &str) -> bool {
        self.heartbeats.fetch_add(1, Ordering::SeqCst);
        self.live_queues.lock().unwrap().contains_key(queue_id)
    }

    async fn update_user_subscriptions(
        &self,
        user_id: UserId,
        community_ids: &[CommunityId],
    ) -> bool {
        self.updates.fetch_add(1, Ordering::SeqCst);
        *self.last_update.lock().unwrap() = Some((user_id, community_ids.to_vec()));
        true
    }
}

/// 把发布的消息保存在内存里的频道
#[derive(Default)]
pub struct CapturingChannel {
    pub messages: Mutex<Vec<serde_json::Value>>,
}

#[async_trait]
impl EventChannel for CapturingChannel {
    async fn publish(&self, _channel: &str, payload: String) -> Result<u32, ChannelError> {
        let value = serde_json::from_str(&payload)?;
        self.messages.lock().unwrap().push(value);
        Ok(1)
    }
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub store: Arc<InMemoryStore>,
    pub queues: Arc<CountingQueueLifecycle>,
    pub channel: Arc<CapturingChannel>,
    pub infrastructure: Infrastructure,
    pub jwt: JwtService,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn token_for(&self, user_id: i64) -> String {
        self.jwt.generate_token(UserId(user_id)).expect("token")
    }

    pub fn publisher(&self) -> RealtimeEventPublisher {
        self.infrastructure.event_publisher()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// 社区 1（私有）、社区 2（公开），文章 3 投稿到社区 1。
///
/// - 用户 5：社区 1 成员，订阅了文章 3
/// - 用户 6：社区 1 版主，订阅了文章 3
/// - 用户 7：只在公开社区 2 中
pub async fn seed(store: &InMemoryStore) {
    store
        .add_community(Community::new(CommunityId(1), "lab", CommunityVisibility::Private))
        .await;
    store
        .add_community(Community::new(CommunityId(2), "open", CommunityVisibility::Public))
        .await;
    store
        .add_community_article(CommunityArticle {
            id: CommunityArticleId(30),
            article_id: ArticleId(3),
            community_id: CommunityId(1),
        })
        .await;

    store.grant_role(UserId(5), CommunityId(1), CommunityRole::Member).await;
    store.grant_role(UserId(6), CommunityId(1), CommunityRole::Moderator).await;
    store.grant_role(UserId(7), CommunityId(2), CommunityRole::Member).await;

    store.subscribe(UserId(5), CommunityArticleId(30), CommunityId(1)).await;
    store.subscribe(UserId(6), CommunityArticleId(30), CommunityId(1)).await;
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(CountingQueueLifecycle::default()).await
}

pub async fn spawn_app_with(queues: CountingQueueLifecycle) -> TestApp {
    let mut config = AppConfig::defaults_for(DeploymentEnvironment::Dev);
    config.jwt.secret = JWT_SECRET.to_string();

    let store = Arc::new(InMemoryStore::new());
    seed(&store).await;
    let queues = Arc::new(queues);
    let channel = Arc::new(CapturingChannel::default());

    let infrastructure =
        Infrastructure::from_store(&config, store.clone(), channel.clone(), queues.clone());
    let jwt = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        expiration_hours: config.jwt.expiration_hours,
    });
    let state = AppState::new(
        Arc::new(infrastructure.realtime_service()),
        Arc::new(jwt.clone()),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = router(state);

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    TestApp {
        addr,
        store,
        queues,
        channel,
        infrastructure,
        jwt,
        shutdown: Some(shutdown_tx),
    }
}

pub fn community_set(ids: &[i64]) -> BTreeSet<CommunityId> {
    ids.iter().copied().map(CommunityId).collect()
}
