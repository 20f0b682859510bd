// src/notify/mod.rs
pub mod digest;
pub mod email;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

use crate::post::Post;

pub use digest::{compose_digest, test_digest, Digest};
pub use email::EmailNotifier;

/// Delivery channel for a composed digest.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, digest: &Digest) -> Result<()>;
}

/// Compose and deliver a digest for `posts`. Errors are logged and reported as
/// `false`; nothing is sent for an empty list.
pub async fn notify_posts(notifier: &dyn Notifier, posts: &[Post], site_url: &str) -> bool {
    if posts.is_empty() {
        tracing::info!("No posts to notify about");
        return true;
    }
    let digest = compose_digest(posts, site_url);
    match notifier.send(&digest).await {
        Ok(()) => {
            tracing::info!(subject = %digest.subject, "Email notification sent successfully");
            true
        }
        Err(e) => {
            tracing::error!("Failed to send email notification: {e:#}");
            false
        }
    }
}

pub async fn send_test_email(notifier: &dyn Notifier) -> bool {
    match notifier.send(&test_digest()).await {
        Ok(()) => {
            tracing::info!("Test email sent successfully");
            true
        }
        Err(e) => {
            tracing::error!("Failed to send test email: {e:#}");
            false
        }
    }
}

// --- Test helper ---
/// Records digests instead of sending them; `failing()` makes every send error.
pub struct MockNotifier {
    pub sent: Mutex<Vec<Digest>>,
    fail: bool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(vec![]),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(vec![]),
            fail: true,
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().map(|v| v.len()).unwrap_or_default()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, digest: &Digest) -> Result<()> {
        if self.fail {
            anyhow::bail!("smtp unavailable");
        }
        if let Ok(mut v) = self.sent.lock() {
            v.push(digest.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(title: &str) -> Post {
        Post {
            title: title.into(),
            url: None,
            date: None,
            content: String::new(),
            scraped_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_batch_sends_nothing() {
        let n = MockNotifier::new();
        assert!(notify_posts(&n, &[], "https://x").await);
        assert_eq!(n.sent_count(), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_false_not_error() {
        let n = MockNotifier::failing();
        assert!(!notify_posts(&n, &[post("A")], "https://x").await);
        assert!(!send_test_email(&n).await);
    }

    #[tokio::test]
    async fn batch_is_sent_as_one_digest() {
        let n = MockNotifier::new();
        assert!(notify_posts(&n, &[post("A"), post("B")], "https://x").await);
        let sent = n.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "New Erasmus Posts: 2 new posts found");
    }
}
