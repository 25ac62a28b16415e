//! # Rusty-Forum Binary
//!
//! Assembles the forum core with the storage plugin chosen at compile time,
//! prepares the database, and seeds the boards listed in the settings.
//! Request handling lives in whatever presentation layer embeds `rf-core`.

use anyhow::Context;
use configs::Settings;
use rf_core::{ContentLimits, ForumOptions, ForumService, ListingOptions};
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

// Feature-gated imports: pick the storage backend at build time
#[cfg(feature = "db-sqlite")]
use rf_db_sqlite::SqliteForumRepo;

#[cfg(not(feature = "db-sqlite"))]
compile_error!("rusty-forum needs a storage backend; enable the `db-sqlite` feature");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings);
    if let Some(path) = &settings.env_file {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo = SqliteForumRepo::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await
    .context("opening SQLite database")?;

    // 2. Wrap in the service (dynamic dispatch keeps the backend swappable)
    let service = ForumService::new(Box::new(repo), forum_options(&settings))?;

    // 3. Seed configured boards
    let existing: Vec<String> = service
        .list_boards()
        .await?
        .into_iter()
        .map(|summary| summary.board.name)
        .collect();
    for seed in &settings.boards {
        if existing.iter().any(|name| name == seed.name.trim()) {
            continue;
        }
        let board = service.create_board(&seed.name, &seed.description).await?;
        tracing::info!(board = %board.name, id = %board.id, "seeded board");
    }

    let index = service.list_boards().await?;
    tracing::info!(boards = index.len(), "forum ready");
    for summary in &index {
        tracing::info!(
            board = %summary.board.name,
            topics = summary.topics_count,
            posts = summary.posts_count,
            "board"
        );
    }
    println!("{}", serde_json::to_string_pretty(&index)?);

    Ok(())
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn forum_options(settings: &Settings) -> ForumOptions {
    ForumOptions {
        listing: ListingOptions {
            topics_per_page: settings.listing.topics_per_page,
            posts_per_page: settings.listing.posts_per_page,
        },
        content: ContentLimits {
            subject_max_chars: settings.content.subject_max_chars,
            message_max_chars: settings.content.message_max_chars,
        },
    }
}
