//! Content constraints for user-submitted text.

use serde::{Deserialize, Serialize};

use crate::error::{ForumError, Result};

pub const BOARD_NAME_MAX_CHARS: usize = 30;
pub const BOARD_DESCRIPTION_MAX_CHARS: usize = 100;

/// Length bounds for topic subjects and post messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentLimits {
    pub subject_max_chars: usize,
    pub message_max_chars: usize,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            subject_max_chars: 255,
            message_max_chars: 4000,
        }
    }
}

impl ContentLimits {
    /// Returns the trimmed subject, or a `ValidationError`.
    pub fn subject(&self, raw: &str) -> Result<String> {
        bounded("subject", raw, self.subject_max_chars)
    }

    /// Returns the trimmed message, or a `ValidationError`.
    pub fn message(&self, raw: &str) -> Result<String> {
        bounded("message", raw, self.message_max_chars)
    }
}

pub(crate) fn board_name(raw: &str) -> Result<String> {
    bounded("board name", raw, BOARD_NAME_MAX_CHARS)
}

pub(crate) fn board_description(raw: &str) -> Result<String> {
    let description = raw.trim();
    if description.chars().count() > BOARD_DESCRIPTION_MAX_CHARS {
        return Err(ForumError::validation(format!(
            "board description is longer than {BOARD_DESCRIPTION_MAX_CHARS} characters"
        )));
    }
    Ok(description.to_string())
}

fn bounded(field: &str, raw: &str, max_chars: usize) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ForumError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_chars {
        return Err(ForumError::validation(format!(
            "{field} is longer than {max_chars} characters"
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let limits = ContentLimits::default();
        assert_eq!(limits.subject("  Hello \n").unwrap(), "Hello");
        assert_eq!(limits.message("\tWorld").unwrap(), "World");
    }

    #[test]
    fn blank_input_is_rejected() {
        let limits = ContentLimits::default();
        for raw in ["", "   ", "\n\t"] {
            assert!(matches!(limits.message(raw), Err(ForumError::ValidationError(_))));
        }
    }

    #[test]
    fn length_is_counted_in_characters() {
        let limits = ContentLimits {
            subject_max_chars: 3,
            message_max_chars: 4000,
        };
        assert_eq!(limits.subject("äöü").unwrap(), "äöü");
        let err = limits.subject("äöüß").unwrap_err();
        assert_eq!(err.to_string(), "validation error: subject is longer than 3 characters");
    }

    #[test]
    fn board_description_may_be_empty() {
        assert_eq!(board_description("  ").unwrap(), "");
        assert!(board_description(&"x".repeat(101)).is_err());
        assert!(board_name(&"x".repeat(31)).is_err());
    }
}
