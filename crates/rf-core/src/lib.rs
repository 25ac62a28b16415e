//! rusty-forum/crates/rf-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Rusty-Forum.

pub mod aggregate;
pub mod error;
pub mod models;
pub mod pagination;
pub mod service;
pub mod traits;
pub mod validation;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use pagination::{paginate, Page, PageMeta, PageRequest, PageWindow, Paginator};
pub use service::{BoardTopics, ForumOptions, ForumService, ListingOptions, TopicPosts};
pub use traits::*;
pub use validation::ContentLimits;
