//! Database schema, applied once on startup.

use sqlx::SqlitePool;

/// Idempotent: every statement is `IF NOT EXISTS`.
pub(crate) const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS boards (
    id          BLOB PRIMARY KEY NOT NULL,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS topics (
    id           BLOB PRIMARY KEY NOT NULL,
    board_id     BLOB NOT NULL REFERENCES boards(id),
    subject      TEXT NOT NULL,
    starter_id   BLOB NOT NULL,
    created_at   TEXT NOT NULL,
    last_updated TEXT NOT NULL,
    views        INTEGER NOT NULL DEFAULT 0 CHECK (views >= 0)
);

CREATE INDEX IF NOT EXISTS idx_topics_board_activity ON topics(board_id, last_updated DESC);

CREATE TABLE IF NOT EXISTS posts (
    id         BLOB PRIMARY KEY NOT NULL,
    topic_id   BLOB NOT NULL REFERENCES topics(id),
    message    TEXT NOT NULL,
    created_by BLOB NOT NULL,
    created_at TEXT NOT NULL,
    updated_by BLOB,
    updated_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_posts_topic_created ON posts(topic_id, created_at);
";

pub(crate) async fn apply(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(SCHEMA).execute(pool).await?;
    tracing::debug!("forum schema applied");
    Ok(())
}
