use std::{
    collections::{BTreeSet, HashMap, HashSet, VecDeque},
    sync::Arc,
};

use domain::{
    ArticleId, CommentDeletedPayload, CommentId, CommentPayload, CommentSnapshot, CommunityId,
    CommunityRepository, Discussion, DiscussionComment, DiscussionDeletedPayload, DiscussionId,
    DiscussionPayload, DiscussionRepository, DiscussionSnapshot, EventEnvelope, RealtimeEvent,
    ReplyMetadata, UserId,
};
use tracing::{debug, error, info, warn};

use super::channel::{EventChannel, PublishOutcome};
use super::subscribers::SubscriberResolver;

/// 事件里内嵌回复的最大层数
pub const MAX_REPLY_NESTING: usize = 32;

pub struct PublisherDependencies {
    pub channel: Arc<dyn EventChannel>,
    pub channel_name: String,
    pub resolver: Arc<SubscriberResolver>,
    pub community_repository: Arc<dyn CommunityRepository>,
    pub discussion_repository: Arc<dyn DiscussionRepository>,
}

/// 已删除评论的标识信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedComment {
    pub comment_id: CommentId,
    pub discussion_id: DiscussionId,
    pub article_id: ArticleId,
    pub author_id: Option<UserId>,
    pub reply: ReplyMetadata,
}

/// 实时事件发布者
///
/// 把一次写操作转换成一个事件信封并发布到频道。调用方必须在写事务提交之后调用，
/// 所有 `publish_*` 方法都不会返回错误：通知失败不能影响已经完成的业务写入。
pub struct RealtimeEventPublisher {
    channel: Arc<dyn EventChannel>,
    channel_name: String,
    resolver: Arc<SubscriberResolver>,
    community_repository: Arc<dyn CommunityRepository>,
    discussion_repository: Arc<dyn DiscussionRepository>,
}

impl RealtimeEventPublisher {
    pub fn new(deps: PublisherDependencies) -> Self {
        Self {
            channel: deps.channel,
            channel_name: deps.channel_name,
            resolver: deps.resolver,
            community_repository: deps.community_repository,
            discussion_repository: deps.discussion_repository,
        }
    }

    /// 构造信封并发布一次，不重试
    pub async fn publish_event(
        &self,
        event: RealtimeEvent,
        community_ids: &BTreeSet<CommunityId>,
        exclude_user_id: Option<UserId>,
    ) -> PublishOutcome {
        let kind = event.kind();
        let envelope = EventEnvelope::new(event, community_ids.clone(), exclude_user_id);

        let payload = match envelope.to_json() {
            Ok(payload) => payload,
            Err(err) => {
                error!(event_type = %kind, error = %err, "failed to serialize realtime event");
                return PublishOutcome::Dropped;
            }
        };
        debug!(event_type = %kind, payload = %payload, "publishing realtime event");

        match self.channel.publish(&self.channel_name, payload).await {
            Ok(receivers) => {
                info!(
                    event_type = %kind,
                    community_ids = ?community_ids,
                    receivers,
                    "published realtime event"
                );
                PublishOutcome::Published { receivers }
            }
            Err(err) => {
                error!(
                    event_type = %kind,
                    community_ids = ?community_ids,
                    error = %err,
                    "failed to publish realtime event"
                );
                PublishOutcome::Dropped
            }
        }
    }

    pub async fn publish_discussion_created(
        &self,
        discussion: &Discussion,
        community_ids: &BTreeSet<CommunityId>,
    ) {
        let author_id = discussion.author.id;
        let mut subscribers = self
            .community_article_subscribers(discussion.article_id, discussion.community_id, None)
            .await;
        subscribers.remove(&author_id);

        let payload = DiscussionPayload {
            discussion: self.discussion_snapshot(discussion).await,
            article_id: discussion.article_id,
            community_id: discussion.community_id,
            subscriber_ids: Some(subscribers.into_iter().collect()),
        };

        self.publish_event(
            RealtimeEvent::DiscussionCreated(payload),
            community_ids,
            Some(author_id),
        )
        .await;
    }

    pub async fn publish_comment_created(
        &self,
        comment: &DiscussionComment,
        community_ids: &BTreeSet<CommunityId>,
    ) {
        let author_id = comment.author.id;
        let mut subscribers = self
            .community_article_subscribers(comment.article_id, comment.community_id, Some(true))
            .await;
        subscribers.remove(&author_id);

        let payload = self
            .comment_payload(comment, Some(subscribers.into_iter().collect()))
            .await;

        self.publish_event(
            RealtimeEvent::CommentCreated(payload),
            community_ids,
            Some(author_id),
        )
        .await;
    }

    // 更新事件不解析订阅者，由投递服务器按社区扇出
    pub async fn publish_discussion_updated(
        &self,
        discussion: &Discussion,
        community_ids: &BTreeSet<CommunityId>,
    ) {
        let payload = DiscussionPayload {
            discussion: self.discussion_snapshot(discussion).await,
            article_id: discussion.article_id,
            community_id: discussion.community_id,
            subscriber_ids: None,
        };

        self.publish_event(
            RealtimeEvent::DiscussionUpdated(payload),
            community_ids,
            Some(discussion.author.id),
        )
        .await;
    }

    pub async fn publish_comment_updated(
        &self,
        comment: &DiscussionComment,
        community_ids: &BTreeSet<CommunityId>,
    ) {
        let payload = self.comment_payload(comment, None).await;

        self.publish_event(
            RealtimeEvent::CommentUpdated(payload),
            community_ids,
            Some(comment.author.id),
        )
        .await;
    }

    pub async fn publish_discussion_deleted(
        &self,
        discussion_id: DiscussionId,
        article_id: ArticleId,
        community_ids: &BTreeSet<CommunityId>,
        author_id: Option<UserId>,
    ) {
        let payload = DiscussionDeletedPayload {
            discussion_id,
            article_id,
        };

        self.publish_event(
            RealtimeEvent::DiscussionDeleted(payload),
            community_ids,
            author_id,
        )
        .await;
    }

    pub async fn publish_comment_deleted(
        &self,
        deleted: DeletedComment,
        community_ids: &BTreeSet<CommunityId>,
    ) {
        let payload = CommentDeletedPayload {
            comment_id: deleted.comment_id,
            discussion_id: deleted.discussion_id,
            article_id: deleted.article_id,
            parent_id: deleted.reply.parent_id,
            is_reply: deleted.reply.parent_id.is_some(),
            reply_depth: deleted.reply.reply_depth,
        };

        self.publish_event(
            RealtimeEvent::CommentDeleted(payload),
            community_ids,
            deleted.author_id,
        )
        .await;
    }

    /// 沿 parent 链走到根评论，`reply_depth` 为经过的链接数。
    ///
    /// 某个祖先读取失败时停在已经走过的深度。
    pub async fn reply_metadata(&self, comment: &DiscussionComment) -> ReplyMetadata {
        let Some(parent_id) = comment.parent_id else {
            return ReplyMetadata::root();
        };

        let mut depth = 0;
        let mut visited = HashSet::from([comment.id]);
        let mut next = Some(parent_id);

        while let Some(current) = next {
            depth += 1;
            if !visited.insert(current) {
                warn!(comment_id = %comment.id, "comment parent chain loops back on itself");
                break;
            }

            next = match self.discussion_repository.find_comment(current).await {
                Ok(Some(ancestor)) => ancestor.parent_id,
                Ok(None) => None,
                Err(err) => {
                    warn!(
                        comment_id = %comment.id,
                        ancestor_id = %current,
                        error = %err,
                        "failed to load comment ancestor"
                    );
                    None
                }
            };
        }

        ReplyMetadata::reply(parent_id, depth)
    }

    async fn community_article_subscribers(
        &self,
        article_id: ArticleId,
        community_id: Option<CommunityId>,
        include_reply_notifications: Option<bool>,
    ) -> BTreeSet<UserId> {
        let Some(community_id) = community_id else {
            return BTreeSet::new();
        };

        let community_article = match self
            .community_repository
            .find_community_article(article_id, community_id)
            .await
        {
            Ok(Some(community_article)) => community_article,
            Ok(None) => return BTreeSet::new(),
            Err(err) => {
                warn!(
                    article_id = %article_id,
                    community_id = %community_id,
                    error = %err,
                    "failed to load community article, publishing without subscribers"
                );
                return BTreeSet::new();
            }
        };

        match include_reply_notifications {
            Some(include_replies) => {
                self.resolver
                    .get_comment_subscribers(&community_article, community_id, include_replies)
                    .await
            }
            None => {
                self.resolver
                    .get_discussion_subscribers(&community_article, community_id)
                    .await
            }
        }
    }

    async fn comment_payload(
        &self,
        comment: &DiscussionComment,
        subscriber_ids: Option<Vec<UserId>>,
    ) -> CommentPayload {
        let reply = self.reply_metadata(comment).await;

        CommentPayload {
            comment: self.comment_snapshot(comment).await,
            discussion_id: comment.discussion_id,
            article_id: comment.article_id,
            community_id: comment.community_id,
            parent_id: reply.parent_id,
            is_reply: reply.is_reply,
            reply_depth: reply.reply_depth,
            subscriber_ids,
        }
    }

    async fn discussion_snapshot(&self, discussion: &Discussion) -> DiscussionSnapshot {
        let comments_count = match self
            .discussion_repository
            .count_comments(discussion.id)
            .await
        {
            Ok(count) => count,
            Err(err) => {
                warn!(discussion_id = %discussion.id, error = %err, "failed to count comments");
                0
            }
        };

        DiscussionSnapshot::from_discussion(discussion, comments_count)
    }

    /// 按层加载整棵回复树再自底向上组装。
    ///
    /// 已经出现过的评论不会再次展开，超过 `MAX_REPLY_NESTING` 层的回复被截掉。
    async fn comment_snapshot(&self, comment: &DiscussionComment) -> CommentSnapshot {
        let mut nodes = vec![comment.clone()];
        let mut children: HashMap<CommentId, Vec<CommentId>> = HashMap::new();
        let mut visited = HashSet::from([comment.id]);
        let mut pending = VecDeque::from([(0usize, 0usize)]);

        while let Some((index, depth)) = pending.pop_front() {
            let parent_id = nodes[index].id;
            if depth >= MAX_REPLY_NESTING {
                warn!(comment_id = %comment.id, "reply tree too deep, truncating");
                continue;
            }

            let replies = match self.discussion_repository.list_replies(parent_id).await {
                Ok(replies) => replies,
                Err(err) => {
                    warn!(comment_id = %parent_id, error = %err, "failed to load comment replies");
                    continue;
                }
            };

            for reply in replies {
                if !visited.insert(reply.id) {
                    warn!(
                        comment_id = %comment.id,
                        reply_id = %reply.id,
                        "reply tree loops back on itself"
                    );
                    continue;
                }
                children.entry(parent_id).or_default().push(reply.id);
                pending.push_back((nodes.len(), depth + 1));
                nodes.push(reply);
            }
        }

        // 子节点总在父节点之后入队，倒序组装时子树已经就绪
        let mut built: HashMap<CommentId, CommentSnapshot> = HashMap::new();
        for node in nodes.iter().rev() {
            let nested = children
                .remove(&node.id)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|id| built.remove(&id))
                .collect();
            built.insert(node.id, CommentSnapshot::from_comment(node, nested));
        }

        built
            .remove(&comment.id)
            .unwrap_or_else(|| CommentSnapshot::from_comment(comment, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use domain::{
        CommunityArticle, CommunityArticleId, MockCommunityRepository, MockDiscussionRepository,
        MockSubscriptionRepository, RepositoryError, UserSummary,
    };
    use serde_json::Value;
    use tokio::sync::Mutex;

    use super::*;
    use crate::realtime::channel::ChannelError;

    /// 记录所有发布内容的频道
    #[derive(Default)]
    struct RecordingChannel {
        published: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingChannel {
        fn failing() -> Self {
            Self {
                published: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        async fn messages(&self) -> Vec<Value> {
            self.published
                .lock()
                .await
                .iter()
                .map(|(_, payload)| serde_json::from_str(payload).unwrap())
                .collect()
        }
    }

    #[async_trait]
    impl EventChannel for RecordingChannel {
        async fn publish(&self, channel: &str, payload: String) -> Result<u32, ChannelError> {
            self.published
                .lock()
                .await
                .push((channel.to_string(), payload));
            if self.fail {
                Err(ChannelError::connection("connection refused"))
            } else {
                Ok(1)
            }
        }
    }

    fn author(id: i64) -> UserSummary {
        UserSummary::new(UserId(id), format!("user{id}"))
    }

    fn discussion(author_id: i64) -> Discussion {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        Discussion {
            id: DiscussionId(10),
            article_id: ArticleId(3),
            community_id: Some(CommunityId(1)),
            author: author(author_id),
            topic: "Methods".to_string(),
            content: "Is the sample size justified?".to_string(),
            created_at: at,
            updated_at: at,
            deleted_at: None,
            anonymous_name: Some("QuietHeron".to_string()),
            avatar: None,
        }
    }

    fn comment(id: i64, parent: Option<i64>, author_id: i64) -> DiscussionComment {
        DiscussionComment {
            id: CommentId(id),
            discussion_id: DiscussionId(10),
            article_id: ArticleId(3),
            community_id: Some(CommunityId(1)),
            author: author(author_id),
            parent_id: parent.map(CommentId),
            content: format!("comment {id}"),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, id as u32).unwrap(),
            upvotes: 0,
            anonymous_name: None,
            avatar: None,
        }
    }

    fn community_repository() -> MockCommunityRepository {
        let mut communities = MockCommunityRepository::new();
        communities
            .expect_find_community_article()
            .returning(|article_id, community_id| {
                Ok(Some(CommunityArticle {
                    id: CommunityArticleId(30),
                    article_id,
                    community_id,
                }))
            });
        communities
    }

    fn subscription_repository(subscribers: Vec<i64>) -> MockSubscriptionRepository {
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions
            .expect_active_subscriber_ids()
            .returning(move |_, _| Ok(subscribers.iter().copied().map(UserId).collect()));
        subscriptions
    }

    /// 以 id -> 评论 的映射模拟评论树
    fn discussion_repository(comments: Vec<DiscussionComment>) -> MockDiscussionRepository {
        let by_id: HashMap<CommentId, DiscussionComment> =
            comments.iter().map(|c| (c.id, c.clone())).collect();
        let all = comments;

        let mut discussions = MockDiscussionRepository::new();
        discussions
            .expect_find_comment()
            .returning(move |id| Ok(by_id.get(&id).cloned()));
        discussions.expect_list_replies().returning(move |parent| {
            Ok(all
                .iter()
                .filter(|c| c.parent_id == Some(parent))
                .cloned()
                .collect())
        });
        discussions.expect_count_comments().returning(|_| Ok(4));
        discussions
    }

    fn publisher(
        channel: Arc<RecordingChannel>,
        communities: MockCommunityRepository,
        subscriptions: MockSubscriptionRepository,
        discussions: MockDiscussionRepository,
    ) -> RealtimeEventPublisher {
        let communities: Arc<dyn CommunityRepository> = Arc::new(communities);
        let resolver = Arc::new(SubscriberResolver::new(
            communities.clone(),
            Arc::new(subscriptions),
        ));

        RealtimeEventPublisher::new(PublisherDependencies {
            channel,
            channel_name: "discussion_events".to_string(),
            resolver,
            community_repository: communities,
            discussion_repository: Arc::new(discussions),
        })
    }

    fn scope() -> BTreeSet<CommunityId> {
        [CommunityId(1)].into_iter().collect()
    }

    #[tokio::test]
    async fn discussion_created_excludes_author_from_subscribers() {
        let channel = Arc::new(RecordingChannel::default());
        // 作者 7 出现在订阅表里（数据异常），也不能出现在 subscriber_ids 中
        let publisher = publisher(
            channel.clone(),
            community_repository(),
            subscription_repository(vec![5, 7, 6]),
            discussion_repository(vec![]),
        );

        publisher
            .publish_discussion_created(&discussion(7), &scope())
            .await;

        let messages = channel.messages().await;
        assert_eq!(messages.len(), 1);
        let message = &messages[0];
        assert_eq!(message["type"], "new_discussion");
        assert_eq!(message["exclude_user_id"], 7);
        assert_eq!(message["community_ids"], serde_json::json!([1]));
        assert_eq!(message["data"]["subscriber_ids"], serde_json::json!([5, 6]));
        assert_eq!(message["data"]["article_id"], 3);
        assert_eq!(message["data"]["community_id"], 1);
        assert_eq!(message["data"]["discussion"]["is_author"], false);
        assert_eq!(message["data"]["discussion"]["comments_count"], 4);
        assert_eq!(
            message["data"]["discussion"]["created_at"],
            "2025-03-01T12:00:00Z"
        );
        assert!(message["timestamp"].is_null());
        assert!(message["event_id"].is_null());
        assert_eq!(channel.published.lock().await[0].0, "discussion_events");
    }

    #[tokio::test]
    async fn discussion_without_community_publishes_empty_subscribers() {
        let channel = Arc::new(RecordingChannel::default());
        let mut communities = MockCommunityRepository::new();
        communities.expect_find_community_article().times(0);
        let publisher = publisher(
            channel.clone(),
            communities,
            MockSubscriptionRepository::new(),
            discussion_repository(vec![]),
        );

        let mut discussion = discussion(7);
        discussion.community_id = None;
        publisher
            .publish_discussion_created(&discussion, &BTreeSet::new())
            .await;

        let messages = channel.messages().await;
        assert!(messages[0]["data"]["community_id"].is_null());
        assert_eq!(messages[0]["data"]["subscriber_ids"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn resolution_failure_still_publishes() {
        let channel = Arc::new(RecordingChannel::default());
        let mut communities = MockCommunityRepository::new();
        communities
            .expect_find_community_article()
            .returning(|_, _| Err(RepositoryError::storage("db down")));
        let publisher = publisher(
            channel.clone(),
            communities,
            MockSubscriptionRepository::new(),
            discussion_repository(vec![]),
        );

        publisher
            .publish_discussion_created(&discussion(7), &scope())
            .await;

        let messages = channel.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["data"]["subscriber_ids"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn duplicate_publishes_are_not_suppressed() {
        let channel = Arc::new(RecordingChannel::default());
        let publisher = publisher(
            channel.clone(),
            community_repository(),
            subscription_repository(vec![5]),
            discussion_repository(vec![]),
        );
        let discussion = discussion(7);

        publisher
            .publish_discussion_created(&discussion, &scope())
            .await;
        publisher
            .publish_discussion_created(&discussion, &scope())
            .await;

        let messages = channel.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], messages[1]);
    }

    #[tokio::test]
    async fn channel_failure_is_swallowed() {
        let channel = Arc::new(RecordingChannel::failing());
        let publisher = publisher(
            channel.clone(),
            community_repository(),
            subscription_repository(vec![5]),
            discussion_repository(vec![]),
        );

        let outcome = publisher
            .publish_event(
                RealtimeEvent::DiscussionDeleted(DiscussionDeletedPayload {
                    discussion_id: DiscussionId(1),
                    article_id: ArticleId(3),
                }),
                &scope(),
                None,
            )
            .await;
        assert_eq!(outcome, PublishOutcome::Dropped);

        // publish_* 不返回任何结果，也不会 panic
        publisher
            .publish_discussion_created(&discussion(7), &scope())
            .await;
        assert_eq!(channel.published.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn publish_event_reports_receivers() {
        let mut channel = crate::realtime::MockEventChannel::new();
        channel
            .expect_publish()
            .withf(|name, payload| {
                name.to_string() == "discussion_events" && payload.contains("\"deleted_discussion\"")
            })
            .times(1)
            .returning(|_, _| Ok(3));

        let communities: Arc<dyn CommunityRepository> = Arc::new(MockCommunityRepository::new());
        let publisher = RealtimeEventPublisher::new(PublisherDependencies {
            channel: Arc::new(channel),
            channel_name: "discussion_events".to_string(),
            resolver: Arc::new(SubscriberResolver::new(
                communities.clone(),
                Arc::new(MockSubscriptionRepository::new()),
            )),
            community_repository: communities,
            discussion_repository: Arc::new(MockDiscussionRepository::new()),
        });

        let outcome = publisher
            .publish_event(
                RealtimeEvent::DiscussionDeleted(DiscussionDeletedPayload {
                    discussion_id: DiscussionId(1),
                    article_id: ArticleId(3),
                }),
                &scope(),
                Some(UserId(7)),
            )
            .await;

        assert_eq!(outcome, PublishOutcome::Published { receivers: 3 });
        assert!(outcome.is_published());
    }

    #[tokio::test]
    async fn reply_chain_depth_is_counted_to_root() {
        // D 回复 C，C 回复 B，B 回复 A
        let chain = vec![
            comment(1, None, 20),
            comment(2, Some(1), 21),
            comment(3, Some(2), 22),
            comment(4, Some(3), 23),
        ];
        let channel = Arc::new(RecordingChannel::default());
        let publisher = publisher(
            channel.clone(),
            community_repository(),
            subscription_repository(vec![20, 23]),
            discussion_repository(chain.clone()),
        );

        publisher
            .publish_comment_created(&chain[3], &scope())
            .await;

        let messages = channel.messages().await;
        let data = &messages[0]["data"];
        assert_eq!(messages[0]["type"], "new_comment");
        assert_eq!(messages[0]["exclude_user_id"], 23);
        assert_eq!(data["parent_id"], 3);
        assert_eq!(data["is_reply"], true);
        assert_eq!(data["reply_depth"], 3);
        assert_eq!(data["discussion_id"], 10);
        assert_eq!(data["subscriber_ids"], serde_json::json!([20]));
    }

    #[tokio::test]
    async fn root_comment_has_zero_depth_and_nested_replies() {
        let tree = vec![
            comment(1, None, 20),
            comment(2, Some(1), 21),
            comment(3, Some(2), 22),
            comment(5, Some(1), 24),
        ];
        let channel = Arc::new(RecordingChannel::default());
        let publisher = publisher(
            channel.clone(),
            community_repository(),
            subscription_repository(vec![]),
            discussion_repository(tree.clone()),
        );

        assert_eq!(publisher.reply_metadata(&tree[0]).await, ReplyMetadata::root());

        publisher.publish_comment_created(&tree[0], &scope()).await;

        let messages = channel.messages().await;
        let data = &messages[0]["data"];
        assert_eq!(data["reply_depth"], 0);
        assert_eq!(data["is_reply"], false);
        assert!(data["parent_id"].is_null());
        let replies = data["comment"]["replies"].as_array().unwrap();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["id"], 2);
        assert_eq!(replies[0]["replies"][0]["id"], 3);
        assert_eq!(data["comment"]["is_author"], false);
    }

    #[tokio::test]
    async fn reply_depth_stops_on_parent_cycle() {
        let looped = vec![comment(1, Some(2), 20), comment(2, Some(1), 21)];
        let publisher = publisher(
            Arc::new(RecordingChannel::default()),
            MockCommunityRepository::new(),
            MockSubscriptionRepository::new(),
            discussion_repository(looped.clone()),
        );

        let reply = publisher.reply_metadata(&looped[0]).await;
        assert_eq!(reply.parent_id, Some(CommentId(2)));
        assert!(reply.is_reply);
        assert_eq!(reply.reply_depth, 2);
    }

    #[tokio::test]
    async fn cyclic_reply_tree_is_published_once_per_comment() {
        let looped = vec![comment(1, Some(2), 20), comment(2, Some(1), 21)];
        let channel = Arc::new(RecordingChannel::default());
        let publisher = publisher(
            channel.clone(),
            community_repository(),
            subscription_repository(vec![21]),
            discussion_repository(looped.clone()),
        );

        publisher.publish_comment_created(&looped[0], &scope()).await;

        let messages = channel.messages().await;
        assert_eq!(messages.len(), 1);
        let root = &messages[0]["data"]["comment"];
        assert_eq!(root["id"], 1);
        assert_eq!(root["replies"][0]["id"], 2);
        assert_eq!(root["replies"][0]["replies"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn deep_reply_chain_is_truncated() {
        let chain: Vec<DiscussionComment> = (1..=40)
            .map(|id| comment(id, (id > 1).then(|| id - 1), 20))
            .collect();
        let channel = Arc::new(RecordingChannel::default());
        let publisher = publisher(
            channel.clone(),
            community_repository(),
            subscription_repository(vec![]),
            discussion_repository(chain.clone()),
        );

        publisher.publish_comment_updated(&chain[0], &scope()).await;

        let messages = channel.messages().await;
        let mut node = &messages[0]["data"]["comment"];
        for _ in 0..MAX_REPLY_NESTING {
            node = &node["replies"][0];
        }
        assert_eq!(node["id"], MAX_REPLY_NESTING as i64 + 1);
        assert_eq!(node["replies"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn updated_events_carry_no_subscriber_list() {
        // 更新事件目前不解析订阅者，与创建事件不对称
        let mut communities = MockCommunityRepository::new();
        communities.expect_find_community_article().times(0);
        let channel = Arc::new(RecordingChannel::default());
        let thread = vec![comment(1, None, 20), comment(2, Some(1), 21)];
        let publisher = publisher(
            channel.clone(),
            communities,
            MockSubscriptionRepository::new(),
            discussion_repository(thread.clone()),
        );

        publisher
            .publish_discussion_updated(&discussion(7), &scope())
            .await;
        publisher.publish_comment_updated(&thread[1], &scope()).await;

        let messages = channel.messages().await;
        assert_eq!(messages[0]["type"], "updated_discussion");
        assert_eq!(messages[0]["exclude_user_id"], 7);
        assert!(messages[0]["data"].get("subscriber_ids").is_none());
        assert_eq!(messages[1]["type"], "updated_comment");
        assert_eq!(messages[1]["exclude_user_id"], 21);
        assert_eq!(messages[1]["data"]["reply_depth"], 1);
        assert!(messages[1]["data"].get("subscriber_ids").is_none());
    }

    #[tokio::test]
    async fn deleted_events_carry_ids_only() {
        let channel = Arc::new(RecordingChannel::default());
        let publisher = publisher(
            channel.clone(),
            MockCommunityRepository::new(),
            MockSubscriptionRepository::new(),
            MockDiscussionRepository::new(),
        );

        publisher
            .publish_discussion_deleted(DiscussionId(10), ArticleId(3), &scope(), Some(UserId(7)))
            .await;
        publisher
            .publish_comment_deleted(
                DeletedComment {
                    comment_id: CommentId(4),
                    discussion_id: DiscussionId(10),
                    article_id: ArticleId(3),
                    author_id: None,
                    reply: ReplyMetadata::reply(CommentId(3), 3),
                },
                &scope(),
            )
            .await;

        let messages = channel.messages().await;
        assert_eq!(
            messages[0]["data"],
            serde_json::json!({"discussion_id": 10, "article_id": 3})
        );
        assert_eq!(messages[0]["exclude_user_id"], 7);
        assert_eq!(
            messages[1]["data"],
            serde_json::json!({
                "comment_id": 4,
                "discussion_id": 10,
                "article_id": 3,
                "parent_id": 3,
                "is_reply": true,
                "reply_depth": 3
            })
        );
        assert!(messages[1]["exclude_user_id"].is_null());
    }
}
