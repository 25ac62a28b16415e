//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Board, BoardSummary, Post, PostLocation, Topic, TopicSummary};

/// Data persistence contract for boards, topics, and posts.
///
/// Multi-row writes (`create_topic`, `create_reply`, `update_post`) must be
/// atomic: either every row lands or none does.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ForumRepo: Send + Sync {
    // Board Operations
    /// Every board with its topic/post totals, from one aggregate query.
    async fn list_boards(&self) -> anyhow::Result<Vec<BoardSummary>>;
    async fn get_board(&self, id: Uuid) -> anyhow::Result<Option<Board>>;
    /// Inserts the board unless its name is taken. Returns false on a name
    /// clash, decided by the store itself in the same statement.
    async fn create_board(&self, board: Board) -> anyhow::Result<bool>;

    // Topic Operations
    async fn count_topics(&self, board_id: Uuid) -> anyhow::Result<u64>;
    /// One page of a board's topics, most recently updated first, each with
    /// its reply count. Must not issue a query per topic.
    async fn list_topics_with_replies(
        &self,
        board_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<Vec<TopicSummary>>;
    /// Looks a topic up only within the given board.
    async fn get_topic(&self, board_id: Uuid, topic_id: Uuid) -> anyhow::Result<Option<Topic>>;
    async fn create_topic(&self, topic: Topic, opening_post: Post) -> anyhow::Result<()>;
    /// Adds one view and returns the new total.
    async fn increment_views(&self, topic_id: Uuid) -> anyhow::Result<u64>;

    // Post Operations
    async fn count_posts(&self, topic_id: Uuid) -> anyhow::Result<u64>;
    /// One page of a topic's posts, oldest first.
    async fn list_posts(&self, topic_id: Uuid, limit: u64, offset: u64) -> anyhow::Result<Vec<Post>>;
    /// Inserts a reply and bumps the topic's `last_updated` to its creation time.
    async fn create_reply(&self, post: Post) -> anyhow::Result<()>;
    async fn get_post(&self, post_id: Uuid) -> anyhow::Result<Option<(Post, PostLocation)>>;
    /// Persists message and updater fields. Returns false if the post is gone.
    async fn update_post(&self, post: &Post) -> anyhow::Result<bool>;
}
