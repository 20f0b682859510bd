// src/post.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One announcement detected on the monitored page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>, // publication date, if the page shows one
    #[serde(default)]
    pub content: String, // snippet, capped by the extractor
    pub scraped_at: DateTime<Utc>,
}

impl Post {
    /// Identity rule used for dedup: same URL (both present) OR same title.
    /// Two different posts sharing a title collapse into one.
    pub fn same_as(&self, other: &Post) -> bool {
        let same_url = matches!(
            (self.url.as_deref(), other.url.as_deref()),
            (Some(a), Some(b)) if a == b
        );
        same_url || self.title == other.title
    }

    /// Cutoff rule: dated posts must be strictly newer, undated posts always pass.
    pub fn is_after(&self, cutoff: NaiveDate) -> bool {
        match self.date {
            Some(d) => d > cutoff,
            None => true,
        }
    }
}
