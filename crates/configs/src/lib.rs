//! # configs
//!
//! Layered settings for the forum binary.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults,
//! 2. `forum.toml` in the working directory (or the file named by
//!    `FORUM_CONFIG`), if present,
//! 3. environment variables such as `FORUM__DATABASE__URL` or
//!    `FORUM__LISTING__TOPICS_PER_PAGE`. A `.env` file is loaded first.

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "forum.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub listing: ListingSettings,
    pub content: ContentSettings,
    pub log: LogSettings,
    /// Boards created on startup when missing.
    #[serde(default)]
    pub boards: Vec<SeedBoard>,
    /// The `.env` file applied by [`Settings::load`], if one was found.
    #[serde(skip)]
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// May embed credentials; never logged.
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListingSettings {
    pub topics_per_page: u64,
    pub posts_per_page: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ContentSettings {
    pub subject_max_chars: usize,
    pub message_max_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedBoard {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Settings {
    /// Loads `.env`, the optional config file, and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let env_file = dotenvy::dotenv().ok();
        let path = std::env::var("FORUM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let builder = defaults()?
            .add_source(File::with_name(&path).required(false))
            .add_source(Environment::with_prefix("FORUM").separator("__"));
        let mut settings = Self::finish(builder.build()?)?;
        settings.env_file = env_file;
        Ok(settings)
    }

    /// Loads defaults overlaid with an inline TOML document. Ignores the
    /// environment.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let builder = defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Self::finish(builder.build()?)
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.listing.topics_per_page == 0 || self.listing.posts_per_page == 0 {
            return Err(ConfigError::Invalid("page sizes must be at least 1".into()));
        }
        if self.content.subject_max_chars == 0 || self.content.message_max_chars == 0 {
            return Err(ConfigError::Invalid("content limits must be at least 1".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be at least 1".into()));
        }
        Ok(())
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("database.url", "sqlite:forum.db")?
        .set_default("database.max_connections", 5)?
        .set_default("listing.topics_per_page", 20)?
        .set_default("listing.posts_per_page", 2)?
        .set_default("content.subject_max_chars", 255)?
        .set_default("content.message_max_chars", 4000)?
        .set_default("log.filter", "info")?
        .set_default("log.json", false)
}
