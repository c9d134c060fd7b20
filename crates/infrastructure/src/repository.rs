//! PostgreSQL 仓储实现
//!
//! 只读访问平台已有的表，不做任何迁移。主键统一转换为 BIGINT 读取。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    ArticleId, CommentId, Community, CommunityArticle, CommunityArticleId, CommunityId,
    CommunityRepository, CommunityRole, CommunityVisibility, DiscussionComment, DiscussionId,
    DiscussionRepository, RepositoryError, RepositoryResult, SubscriptionRepository, UserId,
    UserSummary,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::storage(err.to_string())
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

/// 角色对应的关联表
fn role_table(role: CommunityRole) -> &'static str {
    match role {
        CommunityRole::Member => "communities_membership",
        CommunityRole::Admin => "communities_community_admins",
        CommunityRole::Moderator => "communities_community_moderators",
        CommunityRole::Reviewer => "communities_community_reviewers",
    }
}

#[derive(Debug, FromRow)]
struct CommunityRecord {
    id: i64,
    name: String,
    kind: String,
}

impl TryFrom<CommunityRecord> for Community {
    type Error = RepositoryError;

    fn try_from(value: CommunityRecord) -> Result<Self, Self::Error> {
        let visibility = value
            .kind
            .parse::<CommunityVisibility>()
            .map_err(|err| invalid_data(err.to_string()))?;

        Ok(Community::new(CommunityId(value.id), value.name, visibility))
    }
}

#[derive(Debug, FromRow)]
struct CommunityArticleRecord {
    id: i64,
    article_id: i64,
    community_id: i64,
}

impl From<CommunityArticleRecord> for CommunityArticle {
    fn from(value: CommunityArticleRecord) -> Self {
        CommunityArticle {
            id: CommunityArticleId(value.id),
            article_id: ArticleId(value.article_id),
            community_id: CommunityId(value.community_id),
        }
    }
}

#[derive(Debug, FromRow)]
struct CommentRecord {
    id: i64,
    discussion_id: i64,
    article_id: i64,
    community_id: Option<i64>,
    parent_id: Option<i64>,
    author_id: i64,
    username: String,
    profile_pic_url: Option<String>,
    content: String,
    created_at: DateTime<Utc>,
    upvotes: i64,
    anonymous_name: Option<String>,
    avatar: Option<String>,
}

impl From<CommentRecord> for DiscussionComment {
    fn from(value: CommentRecord) -> Self {
        let mut author = UserSummary::new(UserId(value.author_id), value.username);
        author.profile_pic_url = value.profile_pic_url.filter(|url| !url.is_empty());

        DiscussionComment {
            id: CommentId(value.id),
            discussion_id: DiscussionId(value.discussion_id),
            article_id: ArticleId(value.article_id),
            community_id: value.community_id.map(CommunityId),
            author,
            parent_id: value.parent_id.map(CommentId),
            content: value.content,
            created_at: value.created_at,
            upvotes: value.upvotes,
            anonymous_name: value.anonymous_name,
            avatar: value.avatar,
        }
    }
}

// 评论 + 作者 + 化名 + 点赞数
const COMMENT_SELECT: &str = r#"
    SELECT
        dc.id::bigint AS id,
        dc.discussion_id::bigint AS discussion_id,
        d.article_id::bigint AS article_id,
        dc.community_id::bigint AS community_id,
        dc.parent_id::bigint AS parent_id,
        u.id::bigint AS author_id,
        u.username AS username,
        NULLIF(u.profile_pic_url, '') AS profile_pic_url,
        dc.content AS content,
        dc.created_at AS created_at,
        (
            SELECT COUNT(*)
            FROM articles_reaction r
            JOIN django_content_type ct ON ct.id = r.content_type_id
            WHERE ct.app_label = 'articles'
              AND ct.model = 'discussioncomment'
              AND r.object_id = dc.id
              AND r.vote = 1
        ) AS upvotes,
        ai.fake_name AS anonymous_name,
        ai.identicon AS avatar
    FROM articles_discussioncomment dc
    JOIN articles_discussion d ON d.id = dc.discussion_id
    JOIN users_user u ON u.id = dc.author_id
    LEFT JOIN articles_anonymousidentity ai
        ON dc.is_pseudonymous
       AND ai.user_id = dc.author_id
       AND ai.article_id = d.article_id
       AND ai.community_id IS NOT DISTINCT FROM dc.community_id
"#;

#[derive(Clone)]
pub struct PgCommunityRepository {
    pool: PgPool,
}

impl PgCommunityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommunityRepository for PgCommunityRepository {
    async fn find_community_article(
        &self,
        article_id: ArticleId,
        community_id: CommunityId,
    ) -> RepositoryResult<Option<CommunityArticle>> {
        let record = sqlx::query_as::<_, CommunityArticleRecord>(
            r#"
            SELECT id::bigint AS id, article_id::bigint AS article_id,
                   community_id::bigint AS community_id
            FROM communities_communityarticle
            WHERE article_id = $1 AND community_id = $2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(article_id.value())
        .bind(community_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.map(CommunityArticle::from))
    }

    async fn communities_with_role(
        &self,
        user_id: UserId,
        role: CommunityRole,
    ) -> RepositoryResult<Vec<Community>> {
        let query = format!(
            r#"
            SELECT DISTINCT c.id::bigint AS id, c.name AS name, c.type AS kind
            FROM communities_community c
            JOIN {table} m ON m.community_id = c.id
            WHERE m.user_id = $1
            ORDER BY id
            "#,
            table = role_table(role)
        );

        let records = sqlx::query_as::<_, CommunityRecord>(&query)
            .bind(user_id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        records.into_iter().map(Community::try_from).collect()
    }

    async fn roles_in_community(
        &self,
        user_id: UserId,
        community_id: CommunityId,
    ) -> RepositoryResult<Vec<CommunityRole>> {
        let mut roles = Vec::new();

        for role in CommunityRole::ALL {
            let query = format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = $1 AND community_id = $2)",
                role_table(role)
            );
            let holds: bool = sqlx::query_scalar(&query)
                .bind(user_id.value())
                .bind(community_id.value())
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

            if holds {
                roles.push(role);
            }
        }

        Ok(roles)
    }
}

#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn active_subscriber_ids(
        &self,
        community_article_id: CommunityArticleId,
        community_id: CommunityId,
    ) -> RepositoryResult<Vec<UserId>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT user_id::bigint
            FROM articles_discussionsubscription
            WHERE community_article_id = $1 AND community_id = $2 AND is_active
            ORDER BY 1
            "#,
        )
        .bind(community_article_id.value())
        .bind(community_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(ids.into_iter().map(UserId).collect())
    }

    async fn subscribed_communities(&self, user_id: UserId) -> RepositoryResult<Vec<Community>> {
        let records = sqlx::query_as::<_, CommunityRecord>(
            r#"
            SELECT DISTINCT c.id::bigint AS id, c.name AS name, c.type AS kind
            FROM communities_community c
            JOIN articles_discussionsubscription s ON s.community_id = c.id
            WHERE s.user_id = $1 AND s.is_active
            ORDER BY id
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Community::try_from).collect()
    }
}

#[derive(Clone)]
pub struct PgDiscussionRepository {
    pool: PgPool,
}

impl PgDiscussionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiscussionRepository for PgDiscussionRepository {
    async fn find_comment(&self, id: CommentId) -> RepositoryResult<Option<DiscussionComment>> {
        let query = format!("{COMMENT_SELECT} WHERE dc.id = $1");
        let record = sqlx::query_as::<_, CommentRecord>(&query)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(record.map(DiscussionComment::from))
    }

    async fn list_replies(&self, parent_id: CommentId) -> RepositoryResult<Vec<DiscussionComment>> {
        let query = format!("{COMMENT_SELECT} WHERE dc.parent_id = $1 ORDER BY dc.created_at, dc.id");
        let records = sqlx::query_as::<_, CommentRecord>(&query)
            .bind(parent_id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(DiscussionComment::from).collect())
    }

    async fn count_comments(&self, discussion_id: DiscussionId) -> RepositoryResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM articles_discussioncomment WHERE discussion_id = $1",
        )
        .bind(discussion_id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }
}

/// 三个仓储共享同一个连接池
#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
    pub community_repository: Arc<PgCommunityRepository>,
    pub subscription_repository: Arc<PgSubscriptionRepository>,
    pub discussion_repository: Arc<PgDiscussionRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            community_repository: Arc::new(PgCommunityRepository::new(pool.clone())),
            subscription_repository: Arc::new(PgSubscriptionRepository::new(pool.clone())),
            discussion_repository: Arc::new(PgDiscussionRepository::new(pool.clone())),
            pool,
        }
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
