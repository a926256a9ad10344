//! Mention / MentionKeyword — the persisted article record(s).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on a mention's teaser, enforced at construction.
pub const TEASER_MAX_CHARS: usize = 600;

/// A persisted article record tied to a topic and keyword(s).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mention {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub topic_id: Uuid,
    pub primary_keyword_id: Uuid,
    pub platform_id: Uuid,
    pub title: String,
    pub teaser: String,
    pub normalized_url: String,
    pub raw_url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub read_status: bool,
    pub notified_status: bool,
    pub discovered_at: DateTime<Utc>,
    pub scrape_run_id: String,
}

impl Mention {
    /// Truncate `teaser` to [`TEASER_MAX_CHARS`] characters (not bytes) so
    /// the stored invariant always holds.
    pub fn clamp_teaser(teaser: &str) -> String {
        if teaser.chars().count() <= TEASER_MAX_CHARS {
            teaser.to_string()
        } else {
            teaser.chars().take(TEASER_MAX_CHARS).collect()
        }
    }
}

/// Which field a keyword matched in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchedIn {
    Title,
    Teaser,
}

/// Many-to-many link between a mention and every keyword that matched it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MentionKeyword {
    pub mention_id: Uuid,
    pub keyword_id: Uuid,
    pub matched_in: MatchedIn,
    pub score: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_teaser_is_noop_under_limit() {
        let short = "a short teaser";
        assert_eq!(Mention::clamp_teaser(short), short);
    }

    #[test]
    fn clamp_teaser_truncates_long_text() {
        let long = "x".repeat(1000);
        let clamped = Mention::clamp_teaser(&long);
        assert_eq!(clamped.chars().count(), TEASER_MAX_CHARS);
    }
}
