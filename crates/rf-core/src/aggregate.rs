//! Reply counting.
//!
//! Stores report the raw number of posts per topic from a single grouped
//! query; this turns that figure into the number shown as "replies".

/// `post_count - 1`, since the first post is the topic's own message.
///
/// Clamped at zero: a topic whose opening post went missing outside the
/// forum's own flows reports no replies rather than a negative count.
pub fn replies_from_post_count(post_count: i64) -> u32 {
    u32::try_from(post_count.saturating_sub(1).max(0)).unwrap_or(u32::MAX)
}
