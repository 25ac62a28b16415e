//! # Domain Models
//!
//! These structs represent the core entities of the forum.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A top-level forum category (e.g., "General", "Off-topic").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: Uuid,
    /// Unique display name
    pub name: String,
    pub description: String,
}

/// A discussion thread. Always created together with its opening Post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: Uuid,
    pub board_id: Uuid,
    pub subject: String,
    /// The user who opened the topic
    pub starter_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// The timestamp used for sorting topics by activity
    pub last_updated: DateTime<Utc>,
    /// Number of times the topic's post listing was fetched
    pub views: u64,
}

/// A single message inside a Topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub message: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Topic {
    pub fn new(board_id: Uuid, subject: String, starter_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            board_id,
            subject,
            starter_id,
            created_at: now,
            last_updated: now,
            views: 0,
        }
    }
}

impl Post {
    pub fn new(topic_id: Uuid, message: String, created_by: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            topic_id,
            message,
            created_by,
            created_at: now,
            updated_by: None,
            updated_at: None,
        }
    }

    /// Applies an edit: new message plus updater attribution.
    pub fn revise(&mut self, message: String, editor: Uuid, now: DateTime<Utc>) {
        self.message = message;
        self.updated_by = Some(editor);
        self.updated_at = Some(now);
    }

    pub fn is_edited(&self) -> bool {
        self.updated_at.is_some()
    }
}

/// The authenticated user on whose behalf a mutating operation runs.
///
/// Authentication itself happens outside the core; callers build this from
/// whatever session or token they validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingUser {
    pub id: Uuid,
    /// Staff may edit posts they did not write.
    pub is_staff: bool,
}

impl ActingUser {
    pub fn member(id: Uuid) -> Self {
        Self { id, is_staff: false }
    }

    pub fn staff(id: Uuid) -> Self {
        Self { id, is_staff: true }
    }

    pub fn can_edit(&self, post: &Post) -> bool {
        self.is_staff || post.created_by == self.id
    }
}

/// A row of the board→topics listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    #[serde(flatten)]
    pub topic: Topic,
    /// Posts in the topic minus the opening post. Derived, never stored.
    pub replies: u32,
}

/// A row of the board index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSummary {
    #[serde(flatten)]
    pub board: Board,
    pub topics_count: u64,
    pub posts_count: u64,
    pub last_post_at: Option<DateTime<Utc>>,
}

/// Where a post lives, for navigating back to its topic listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostLocation {
    pub board_id: Uuid,
    pub topic_id: Uuid,
}
