//! # ForumError
//!
//! Centralized error handling for the forum core.
//! Every service operation returns one of these variants; rendering them
//! (status codes, messages) is left to the presentation layer.

use thiserror::Error;

/// The primary error type for all rf-core operations.
#[derive(Error, Debug)]
pub enum ForumError {
    /// Resource not found (e.g., Board, Topic, Post), or a Topic that
    /// does not belong to the Board named in the request.
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Content failed its constraints (empty, too long) or a listing was
    /// configured with an unusable page size.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The acting user may not perform this mutation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., duplicate board name)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure reported by the repository. Opaque to the core;
    /// the caller may retry.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl ForumError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound(entity, id.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(..))
    }
}

/// A specialized Result type for forum logic.
pub type Result<T> = std::result::Result<T, ForumError>;
