//! # ForumService
//!
//! Orchestrates listings and write workflows on top of a [`ForumRepo`].
//! The service holds no per-request state: every call loads what it needs,
//! applies the rules, and hands a result (or a typed error) back to the caller.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{ForumError, Result};
use crate::models::{ActingUser, Board, BoardSummary, Post, PostLocation, Topic, TopicSummary};
use crate::pagination::{Page, PageRequest, Paginator};
use crate::traits::ForumRepo;
use crate::validation::{self, ContentLimits};

/// Page sizes per listing type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingOptions {
    pub topics_per_page: u64,
    pub posts_per_page: u64,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            topics_per_page: 20,
            posts_per_page: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumOptions {
    pub listing: ListingOptions,
    pub content: ContentLimits,
}

/// Result of the board→topics listing.
#[derive(Debug, Clone, Serialize)]
pub struct BoardTopics {
    pub board: Board,
    pub topics: Page<TopicSummary>,
}

/// Result of the topic→posts listing. `topic.views` already includes the
/// view recorded by the request that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct TopicPosts {
    pub topic: Topic,
    pub posts: Page<Post>,
}

pub struct ForumService {
    repo: Box<dyn ForumRepo>,
    topics: Paginator,
    posts: Paginator,
    limits: ContentLimits,
}

impl ForumService {
    pub fn new(repo: Box<dyn ForumRepo>, options: ForumOptions) -> Result<Self> {
        Ok(Self {
            repo,
            topics: Paginator::new(options.listing.topics_per_page)?,
            posts: Paginator::new(options.listing.posts_per_page)?,
            limits: options.content,
        })
    }

    /// The board index.
    pub async fn list_boards(&self) -> Result<Vec<BoardSummary>> {
        Ok(self.repo.list_boards().await?)
    }

    #[instrument(skip(self))]
    pub async fn create_board(&self, name: &str, description: &str) -> Result<Board> {
        let name = validation::board_name(name)?;
        let description = validation::board_description(description)?;

        let board = Board {
            id: Uuid::now_v7(),
            name,
            description,
        };
        if !self.repo.create_board(board.clone()).await? {
            return Err(ForumError::Conflict(format!(
                "board '{}' already exists",
                board.name
            )));
        }
        info!(board_id = %board.id, "board created");
        Ok(board)
    }

    /// Topics of a board, most recently active first, with reply counts.
    #[instrument(skip(self))]
    pub async fn list_board_topics(&self, board_id: Uuid, page: PageRequest) -> Result<BoardTopics> {
        let board = self.load_board(board_id).await?;

        let total = self.repo.count_topics(board.id).await?;
        let window = self.topics.window(total, page);
        let items = if window.is_empty() {
            Vec::new()
        } else {
            self.repo
                .list_topics_with_replies(board.id, window.limit, window.offset)
                .await?
        };
        debug!(page = window.number, of = window.num_pages, total, "listed board topics");

        Ok(BoardTopics {
            board,
            topics: Page::new(items, window),
        })
    }

    /// Posts of a topic, oldest first. Every call counts as one view,
    /// including repeat fetches and page changes.
    #[instrument(skip(self))]
    pub async fn list_topic_posts(
        &self,
        board_id: Uuid,
        topic_id: Uuid,
        page: PageRequest,
    ) -> Result<TopicPosts> {
        let mut topic = self.load_topic(board_id, topic_id).await?;
        topic.views = self.repo.increment_views(topic.id).await?;

        let total = self.repo.count_posts(topic.id).await?;
        let window = self.posts.window(total, page);
        let items = if window.is_empty() {
            Vec::new()
        } else {
            self.repo.list_posts(topic.id, window.limit, window.offset).await?
        };
        debug!(page = window.number, of = window.num_pages, views = topic.views, "listed topic posts");

        Ok(TopicPosts {
            topic,
            posts: Page::new(items, window),
        })
    }

    /// Opens a topic together with its first post. Returns the new topic's id.
    #[instrument(skip(self, subject, message), fields(actor = %actor.id))]
    pub async fn create_topic(
        &self,
        board_id: Uuid,
        subject: &str,
        message: &str,
        actor: &ActingUser,
    ) -> Result<Uuid> {
        let board = self.load_board(board_id).await?;
        let subject = self.limits.subject(subject)?;
        let message = self.limits.message(message)?;

        let now = Utc::now();
        let topic = Topic::new(board.id, subject, actor.id, now);
        let opening_post = Post::new(topic.id, message, actor.id, now);
        let topic_id = topic.id;

        self.repo.create_topic(topic, opening_post).await?;
        info!(%topic_id, "topic created");
        Ok(topic_id)
    }

    /// Appends a reply. Returns the topic's id for navigation.
    #[instrument(skip(self, message), fields(actor = %actor.id))]
    pub async fn reply_topic(
        &self,
        board_id: Uuid,
        topic_id: Uuid,
        message: &str,
        actor: &ActingUser,
    ) -> Result<Uuid> {
        let topic = self.load_topic(board_id, topic_id).await?;
        let message = self.limits.message(message)?;

        let post = Post::new(topic.id, message, actor.id, Utc::now());
        let post_id = post.id;
        self.repo.create_reply(post).await?;
        info!(%post_id, "reply added");
        Ok(topic.id)
    }

    /// Replaces a post's message, attributing the change to `actor`.
    #[instrument(skip(self, message), fields(actor = %actor.id))]
    pub async fn edit_post(
        &self,
        post_id: Uuid,
        message: &str,
        actor: &ActingUser,
    ) -> Result<PostLocation> {
        let (mut post, location) = self
            .repo
            .get_post(post_id)
            .await?
            .ok_or_else(|| ForumError::not_found("Post", post_id))?;

        if !actor.can_edit(&post) {
            warn!("edit refused: not the author");
            return Err(ForumError::Unauthorized(format!(
                "user {} may not edit post {}",
                actor.id, post_id
            )));
        }

        let message = self.limits.message(message)?;
        post.revise(message, actor.id, Utc::now());

        if !self.repo.update_post(&post).await? {
            return Err(ForumError::not_found("Post", post_id));
        }
        info!("post edited");
        Ok(location)
    }

    async fn load_board(&self, board_id: Uuid) -> Result<Board> {
        self.repo
            .get_board(board_id)
            .await?
            .ok_or_else(|| ForumError::not_found("Board", board_id))
    }

    async fn load_topic(&self, board_id: Uuid, topic_id: Uuid) -> Result<Topic> {
        self.repo
            .get_topic(board_id, topic_id)
            .await?
            .ok_or_else(|| ForumError::not_found("Topic", topic_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockForumRepo;
    use mockall::predicate::eq;

    fn board() -> Board {
        Board {
            id: Uuid::now_v7(),
            name: "General".into(),
            description: "Anything goes".into(),
        }
    }

    fn service(repo: MockForumRepo) -> ForumService {
        ForumService::new(Box::new(repo), ForumOptions::default()).unwrap()
    }

    #[test]
    fn zero_page_size_is_rejected_at_construction() {
        let options = ForumOptions {
            listing: ListingOptions {
                topics_per_page: 0,
                posts_per_page: 2,
            },
            ..ForumOptions::default()
        };
        let result = ForumService::new(Box::new(MockForumRepo::new()), options);
        assert!(matches!(result, Err(ForumError::ValidationError(_))));
    }

    #[tokio::test]
    async fn listing_unknown_board_is_not_found() {
        let mut repo = MockForumRepo::new();
        repo.expect_get_board().returning(|_| Ok(None));
        repo.expect_count_topics().never();

        let err = service(repo)
            .list_board_topics(Uuid::now_v7(), PageRequest::first())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn empty_board_skips_the_topic_query() {
        let board = board();
        let id = board.id;
        let mut repo = MockForumRepo::new();
        repo.expect_get_board()
            .with(eq(id))
            .returning(move |_| Ok(Some(board.clone())));
        repo.expect_count_topics().returning(|_| Ok(0));
        repo.expect_list_topics_with_replies().never();

        let listing = service(repo)
            .list_board_topics(id, PageRequest::parse(Some("7")))
            .await
            .unwrap();
        assert!(listing.topics.is_empty());
        assert_eq!(listing.topics.meta.number, 1);
        assert_eq!(listing.topics.meta.num_pages, 1);
    }

    #[tokio::test]
    async fn page_past_the_end_fetches_last_window() {
        let board = board();
        let id = board.id;
        let mut repo = MockForumRepo::new();
        repo.expect_get_board().returning(move |_| Ok(Some(board.clone())));
        repo.expect_count_topics().returning(|_| Ok(45));
        repo.expect_list_topics_with_replies()
            .with(eq(id), eq(20), eq(40))
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));

        let listing = service(repo)
            .list_board_topics(id, PageRequest::from(9))
            .await
            .unwrap();
        assert_eq!(listing.topics.meta.number, 3);
    }

    #[tokio::test]
    async fn topic_listing_records_a_view() {
        let board_id = Uuid::now_v7();
        let topic = Topic::new(board_id, "Hello".into(), Uuid::now_v7(), Utc::now());
        let topic_id = topic.id;
        let post = Post::new(topic_id, "World".into(), topic.starter_id, topic.created_at);

        let mut repo = MockForumRepo::new();
        repo.expect_get_topic()
            .with(eq(board_id), eq(topic_id))
            .returning(move |_, _| Ok(Some(topic.clone())));
        repo.expect_increment_views()
            .with(eq(topic_id))
            .times(1)
            .returning(|_| Ok(5));
        repo.expect_count_posts().returning(|_| Ok(1));
        repo.expect_list_posts()
            .with(eq(topic_id), eq(2), eq(0))
            .returning(move |_, _, _| Ok(vec![post.clone()]));

        let listing = service(repo)
            .list_topic_posts(board_id, topic_id, PageRequest::first())
            .await
            .unwrap();
        assert_eq!(listing.topic.views, 5);
        assert_eq!(listing.posts.items.len(), 1);
    }

    #[tokio::test]
    async fn topic_outside_board_is_not_found_and_not_counted() {
        let mut repo = MockForumRepo::new();
        repo.expect_get_topic().returning(|_, _| Ok(None));
        repo.expect_increment_views().never();

        let err = service(repo)
            .list_topic_posts(Uuid::now_v7(), Uuid::now_v7(), PageRequest::first())
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::NotFound("Topic", _)));
    }

    #[tokio::test]
    async fn create_topic_attributes_both_rows_to_actor() {
        let board = board();
        let board_id = board.id;
        let actor = ActingUser::member(Uuid::now_v7());

        let mut repo = MockForumRepo::new();
        repo.expect_get_board().returning(move |_| Ok(Some(board.clone())));
        repo.expect_create_topic()
            .withf(move |topic, post| {
                topic.board_id == board_id
                    && topic.subject == "Hello"
                    && topic.starter_id == actor.id
                    && post.topic_id == topic.id
                    && post.message == "World"
                    && post.created_by == actor.id
            })
            .times(1)
            .returning(|_, _| Ok(()));

        service(repo)
            .create_topic(board_id, " Hello ", "World", &actor)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn invalid_topic_content_writes_nothing() {
        let board = board();
        let board_id = board.id;
        let mut repo = MockForumRepo::new();
        repo.expect_get_board().returning(move |_| Ok(Some(board.clone())));
        repo.expect_create_topic().never();
        let service = service(repo);
        let actor = ActingUser::member(Uuid::now_v7());

        let empty_subject = service.create_topic(board_id, "  ", "World", &actor).await;
        assert!(matches!(empty_subject, Err(ForumError::ValidationError(_))));

        let long_message = "x".repeat(4001);
        let too_long = service.create_topic(board_id, "Hello", &long_message, &actor).await;
        assert!(matches!(too_long, Err(ForumError::ValidationError(_))));
    }

    #[tokio::test]
    async fn missing_board_wins_over_invalid_content() {
        let mut repo = MockForumRepo::new();
        repo.expect_get_board().returning(|_| Ok(None));
        repo.expect_create_topic().never();

        let err = service(repo)
            .create_topic(Uuid::now_v7(), "", "", &ActingUser::member(Uuid::now_v7()))
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::NotFound("Board", _)));
    }

    #[tokio::test]
    async fn reply_returns_topic_id() {
        let board_id = Uuid::now_v7();
        let topic = Topic::new(board_id, "Hello".into(), Uuid::now_v7(), Utc::now());
        let topic_id = topic.id;
        let replier = ActingUser::member(Uuid::now_v7());

        let mut repo = MockForumRepo::new();
        repo.expect_get_topic().returning(move |_, _| Ok(Some(topic.clone())));
        repo.expect_create_reply()
            .withf(move |post| post.topic_id == topic_id && post.created_by == replier.id)
            .times(1)
            .returning(|_| Ok(()));

        let id = service(repo)
            .reply_topic(board_id, topic_id, "Reply1", &replier)
            .await
            .unwrap();
        assert_eq!(id, topic_id);
    }

    #[tokio::test]
    async fn edit_by_stranger_is_unauthorized() {
        let author = Uuid::now_v7();
        let post = Post::new(Uuid::now_v7(), "World".into(), author, Utc::now());
        let post_id = post.id;
        let location = PostLocation {
            board_id: Uuid::now_v7(),
            topic_id: post.topic_id,
        };

        let mut repo = MockForumRepo::new();
        repo.expect_get_post()
            .returning(move |_| Ok(Some((post.clone(), location))));
        repo.expect_update_post().never();

        let err = service(repo)
            .edit_post(post_id, "hijacked", &ActingUser::member(Uuid::now_v7()))
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn staff_edit_records_staff_as_updater() {
        let post = Post::new(Uuid::now_v7(), "World".into(), Uuid::now_v7(), Utc::now());
        let post_id = post.id;
        let location = PostLocation {
            board_id: Uuid::now_v7(),
            topic_id: post.topic_id,
        };
        let moderator = ActingUser::staff(Uuid::now_v7());

        let mut repo = MockForumRepo::new();
        repo.expect_get_post()
            .returning(move |_| Ok(Some((post.clone(), location))));
        repo.expect_update_post()
            .withf(move |post| {
                post.message == "World (edited)"
                    && post.updated_by == Some(moderator.id)
                    && post.updated_at.is_some()
            })
            .times(1)
            .returning(|_| Ok(true));

        let at = service(repo)
            .edit_post(post_id, "World (edited)", &moderator)
            .await
            .unwrap();
        assert_eq!(at, location);
    }

    #[tokio::test]
    async fn blank_edit_is_rejected_without_writing() {
        let author = ActingUser::member(Uuid::now_v7());
        let post = Post::new(Uuid::now_v7(), "World".into(), author.id, Utc::now());
        let post_id = post.id;
        let location = PostLocation {
            board_id: Uuid::now_v7(),
            topic_id: post.topic_id,
        };

        let mut repo = MockForumRepo::new();
        repo.expect_get_post()
            .returning(move |_| Ok(Some((post.clone(), location))));
        repo.expect_update_post().never();

        let err = service(repo)
            .edit_post(post_id, "  ", &author)
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::ValidationError(_)));
    }

    #[tokio::test]
    async fn storage_failures_surface_as_storage_errors() {
        let mut repo = MockForumRepo::new();
        repo.expect_list_boards()
            .returning(|| Err(anyhow::anyhow!("database is locked")));

        let err = service(repo).list_boards().await.unwrap_err();
        assert!(matches!(err, ForumError::Storage(_)));
    }

    #[tokio::test]
    async fn duplicate_board_name_conflicts() {
        let mut repo = MockForumRepo::new();
        repo.expect_create_board()
            .withf(|board| board.name == "General")
            .times(1)
            .returning(|_| Ok(false));

        let err = service(repo).create_board(" General ", "").await.unwrap_err();
        assert!(matches!(err, ForumError::Conflict(_)));
    }
}
