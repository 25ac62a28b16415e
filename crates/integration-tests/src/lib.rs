//! Shared fixtures for the end-to-end tests: a service over a fresh
//! in-memory SQLite store, plus a few named users.

pub mod fixtures {
    use rf_core::{ActingUser, Board, ForumOptions, ForumService};
    use rf_db_sqlite::SqliteForumRepo;
    use uuid::Uuid;

    /// A service over a private in-memory database with default page sizes.
    pub async fn forum() -> ForumService {
        forum_with(ForumOptions::default()).await
    }

    pub async fn forum_with(options: ForumOptions) -> ForumService {
        let repo = SqliteForumRepo::in_memory()
            .await
            .expect("in-memory SQLite should open");
        ForumService::new(Box::new(repo), options).expect("valid forum options")
    }

    /// A service plus one empty board named "General".
    pub async fn forum_with_board() -> (ForumService, Board) {
        let forum = forum().await;
        let board = forum
            .create_board("General", "Anything goes")
            .await
            .expect("board should be created");
        (forum, board)
    }

    pub fn user() -> ActingUser {
        ActingUser::member(Uuid::now_v7())
    }

    pub fn moderator() -> ActingUser {
        ActingUser::staff(Uuid::now_v7())
    }
}
