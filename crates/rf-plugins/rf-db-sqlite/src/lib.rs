//! # rf-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `rf-core` domain models.

mod schema;

use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rf_core::aggregate::replies_from_post_count;
use rf_core::models::{Board, BoardSummary, Post, PostLocation, Topic, TopicSummary};
use rf_core::traits::ForumRepo;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

const TOPIC_COLUMNS: &str =
    "t.id, t.board_id, t.subject, t.starter_id, t.created_at, t.last_updated, t.views";
const POST_COLUMNS: &str =
    "p.id, p.topic_id, p.message, p.created_by, p.created_at, p.updated_by, p.updated_at";

pub struct SqliteForumRepo {
    pool: SqlitePool,
}

impl SqliteForumRepo {
    /// Opens (creating if needed) the database at `url` and applies the schema.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .context("invalid SQLite connection URL")?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.migrate().await?;
        Ok(repo)
    }

    /// A private in-memory database. One connection only: every SQLite
    /// `:memory:` connection is its own database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.migrate().await?;
        Ok(repo)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        schema::apply(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn to_i64(n: u64) -> anyhow::Result<i64> {
    i64::try_from(n).with_context(|| format!("{n} does not fit a SQLite integer"))
}

fn to_u64(n: i64) -> anyhow::Result<u64> {
    u64::try_from(n).with_context(|| format!("negative count {n} read from database"))
}

fn board_from_row(row: &SqliteRow) -> anyhow::Result<Board> {
    Ok(Board {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

fn topic_from_row(row: &SqliteRow) -> anyhow::Result<Topic> {
    Ok(Topic {
        id: row.try_get("id")?,
        board_id: row.try_get("board_id")?,
        subject: row.try_get("subject")?,
        starter_id: row.try_get("starter_id")?,
        created_at: row.try_get("created_at")?,
        last_updated: row.try_get("last_updated")?,
        views: to_u64(row.try_get("views")?)?,
    })
}

fn post_from_row(row: &SqliteRow) -> anyhow::Result<Post> {
    Ok(Post {
        id: row.try_get("id")?,
        topic_id: row.try_get("topic_id")?,
        message: row.try_get("message")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_by: row.try_get("updated_by")?,
        updated_at: row.try_get("updated_at")?,
    })
}

async fn insert_post<'e, E>(executor: E, post: &Post) -> anyhow::Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO posts (id, topic_id, message, created_by, created_at, updated_by, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(post.id)
    .bind(post.topic_id)
    .bind(&post.message)
    .bind(post.created_by)
    .bind(post.created_at)
    .bind(post.updated_by)
    .bind(post.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl ForumRepo for SqliteForumRepo {
    /// Board index with per-board totals in a single grouped query.
    async fn list_boards(&self) -> anyhow::Result<Vec<BoardSummary>> {
        let rows = sqlx::query(
            "SELECT b.id, b.name, b.description, \
                    COUNT(DISTINCT t.id) AS topics_count, \
                    COUNT(p.id) AS posts_count, \
                    MAX(p.created_at) AS last_post_at \
             FROM boards b \
             LEFT JOIN topics t ON t.board_id = b.id \
             LEFT JOIN posts p ON p.topic_id = t.id \
             GROUP BY b.id \
             ORDER BY b.name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> anyhow::Result<BoardSummary> {
                Ok(BoardSummary {
                    board: board_from_row(row)?,
                    topics_count: to_u64(row.try_get("topics_count")?)?,
                    posts_count: to_u64(row.try_get("posts_count")?)?,
                    last_post_at: row.try_get::<Option<DateTime<Utc>>, _>("last_post_at")?,
                })
            })
            .collect()
    }

    async fn get_board(&self, id: Uuid) -> anyhow::Result<Option<Board>> {
        let row = sqlx::query("SELECT id, name, description FROM boards WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(board_from_row).transpose()
    }

    async fn create_board(&self, board: Board) -> anyhow::Result<bool> {
        let inserted = sqlx::query(
            "INSERT INTO boards (id, name, description) VALUES (?, ?, ?) \
             ON CONFLICT(name) DO NOTHING",
        )
        .bind(board.id)
        .bind(board.name)
        .bind(board.description)
        .execute(&self.pool)
        .await?;
        Ok(inserted.rows_affected() > 0)
    }

    async fn count_topics(&self, board_id: Uuid) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM topics WHERE board_id = ?")
            .bind(board_id)
            .fetch_one(&self.pool)
            .await?;
        to_u64(count)
    }

    /// Reply counts come from the same grouped query that orders and slices
    /// the topics, so a page costs one round trip regardless of its size.
    async fn list_topics_with_replies(
        &self,
        board_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<Vec<TopicSummary>> {
        let rows = sqlx::query(&format!(
            "SELECT {TOPIC_COLUMNS}, COUNT(p.id) AS post_count \
             FROM topics t \
             LEFT JOIN posts p ON p.topic_id = t.id \
             WHERE t.board_id = ? \
             GROUP BY t.id \
             ORDER BY t.last_updated DESC, t.id DESC \
             LIMIT ? OFFSET ?"
        ))
        .bind(board_id)
        .bind(to_i64(limit)?)
        .bind(to_i64(offset)?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> anyhow::Result<TopicSummary> {
                Ok(TopicSummary {
                    topic: topic_from_row(row)?,
                    replies: replies_from_post_count(row.try_get("post_count")?),
                })
            })
            .collect()
    }

    async fn get_topic(&self, board_id: Uuid, topic_id: Uuid) -> anyhow::Result<Option<Topic>> {
        let row = sqlx::query(&format!(
            "SELECT {TOPIC_COLUMNS} FROM topics t WHERE t.id = ? AND t.board_id = ?"
        ))
        .bind(topic_id)
        .bind(board_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(topic_from_row).transpose()
    }

    /// Atomic operation to create a topic and its first post.
    ///
    /// # Developer Note
    /// Using a Transaction (tx) ensures we don't end up with "ghost topics"
    /// that have no opening post if the second insert fails.
    async fn create_topic(&self, topic: Topic, opening_post: Post) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO topics (id, board_id, subject, starter_id, created_at, last_updated, views) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(topic.id)
        .bind(topic.board_id)
        .bind(&topic.subject)
        .bind(topic.starter_id)
        .bind(topic.created_at)
        .bind(topic.last_updated)
        .bind(to_i64(topic.views)?)
        .execute(&mut *tx)
        .await?;

        insert_post(&mut *tx, &opening_post).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn increment_views(&self, topic_id: Uuid) -> anyhow::Result<u64> {
        let views: Option<i64> =
            sqlx::query_scalar("UPDATE topics SET views = views + 1 WHERE id = ? RETURNING views")
                .bind(topic_id)
                .fetch_optional(&self.pool)
                .await?;
        let views = views.with_context(|| format!("topic {topic_id} disappeared while counting a view"))?;
        to_u64(views)
    }

    async fn count_posts(&self, topic_id: Uuid) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE topic_id = ?")
            .bind(topic_id)
            .fetch_one(&self.pool)
            .await?;
        to_u64(count)
    }

    async fn list_posts(&self, topic_id: Uuid, limit: u64, offset: u64) -> anyhow::Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts p \
             WHERE p.topic_id = ? \
             ORDER BY p.created_at ASC, p.id ASC \
             LIMIT ? OFFSET ?"
        ))
        .bind(topic_id)
        .bind(to_i64(limit)?)
        .bind(to_i64(offset)?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(post_from_row).collect()
    }

    async fn create_reply(&self, post: Post) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        insert_post(&mut *tx, &post).await?;

        let bumped = sqlx::query("UPDATE topics SET last_updated = ? WHERE id = ?")
            .bind(post.created_at)
            .bind(post.topic_id)
            .execute(&mut *tx)
            .await?;
        if bumped.rows_affected() == 0 {
            // tx is dropped here, rolling back the insert
            anyhow::bail!("topic {} not found while adding reply", post.topic_id);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_post(&self, post_id: Uuid) -> anyhow::Result<Option<(Post, PostLocation)>> {
        let row = sqlx::query(&format!(
            "SELECT {POST_COLUMNS}, t.board_id FROM posts p \
             JOIN topics t ON t.id = p.topic_id \
             WHERE p.id = ?"
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let post = post_from_row(&row)?;
        let location = PostLocation {
            board_id: row.try_get("board_id")?,
            topic_id: post.topic_id,
        };
        Ok(Some((post, location)))
    }

    async fn update_post(&self, post: &Post) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE posts SET message = ?, updated_by = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&post.message)
        .bind(post.updated_by)
        .bind(post.updated_at)
        .bind(post.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated.rows_affected() > 0)
    }
}
