// src/tracker.rs
//! One tracking run: fetch → extract → cutoff filter → novelty filter → record.
//!
//! New posts are persisted one by one as they are confirmed, so a crash halfway
//! through a run never causes a re-notification of posts already stored.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::notify::{notify_posts, Notifier};
use crate::post::Post;
use crate::scrape::{PageSource, PostExtractor};
use crate::store::PostStore;

/// One-time metrics registration (so series show up once a recorder is installed).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("tracker_fetch_errors_total", "Page fetch failures.");
        describe_counter!(
            "tracker_posts_extracted_total",
            "Candidate posts extracted from the page."
        );
        describe_counter!(
            "tracker_posts_new_total",
            "Posts that passed the cutoff and novelty filters."
        );
        describe_histogram!("tracker_extract_ms", "Extraction time in milliseconds.");
        describe_gauge!(
            "tracker_last_check_ts",
            "Unix ts of the last completed check."
        );
    });
}

pub struct Tracker<S: PageSource> {
    source: S,
    extractor: PostExtractor,
    store: PostStore,
    cutoff: NaiveDate,
}

impl<S: PageSource> Tracker<S> {
    pub fn new(source: S, extractor: PostExtractor, store: PostStore, cutoff: NaiveDate) -> Self {
        Self {
            source,
            extractor,
            store,
            cutoff,
        }
    }

    pub fn from_settings(source: S, settings: &Settings) -> Self {
        Self::new(
            source,
            PostExtractor::new(settings.site_origin.clone()),
            PostStore::load(&settings.data_file),
            settings.last_known_date,
        )
    }

    pub fn store(&self) -> &PostStore {
        &self.store
    }

    pub fn into_store(self) -> PostStore {
        self.store
    }

    /// Scrape the page, keep posts newer than the cutoff, record and return the unseen ones.
    /// Never fails: fetch problems are logged and yield an empty result.
    pub async fn check_for_new_posts(&mut self) -> Vec<Post> {
        ensure_metrics_described();
        info!(url = self.source.location(), "Starting post check...");

        let markup = match self.source.fetch_page().await {
            Ok(body) => body,
            Err(e) => {
                error!(url = self.source.location(), "Error fetching page: {e:#}");
                counter!("tracker_fetch_errors_total").increment(1);
                return Vec::new();
            }
        };
        if markup.trim().is_empty() {
            warn!(url = self.source.location(), "page body is empty");
            return Vec::new();
        }

        let t0 = std::time::Instant::now();
        let candidates = self.extractor.extract(&markup);
        histogram!("tracker_extract_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("tracker_posts_extracted_total").increment(candidates.len() as u64);
        if candidates.is_empty() {
            warn!("No posts found during scraping");
        }

        // 1) Cutoff: dated posts must be newer, undated ones are kept to be safe
        let total = candidates.len();
        let recent: Vec<Post> = candidates
            .into_iter()
            .filter(|p| p.is_after(self.cutoff))
            .collect();
        info!(
            "Found {} posts newer than {}",
            recent.len(),
            self.cutoff.format("%Y-%m-%d")
        );

        // 2) Novelty: persist each new post right away
        let mut new_posts = Vec::new();
        for post in recent {
            if self.store.is_new_post(&post) {
                self.store.add_post(post.clone());
                new_posts.push(post);
            }
        }

        self.store.mark_checked();
        counter!("tracker_posts_new_total").increment(new_posts.len() as u64);
        gauge!("tracker_last_check_ts").set(Utc::now().timestamp() as f64);

        info!(
            "Found {} new posts out of {} total posts",
            new_posts.len(),
            total
        );
        new_posts
    }
}

/// Default CLI action: validate, check, notify. Returns the number of new posts.
///
/// Configuration problems fail before any network activity. A failed
/// notification is logged but does not fail the run; the posts stay recorded.
pub async fn run_check<S: PageSource>(
    settings: &Settings,
    tracker: &mut Tracker<S>,
    notifier: &dyn Notifier,
) -> Result<usize> {
    settings.validate()?;

    let new_posts = tracker.check_for_new_posts().await;
    if new_posts.is_empty() {
        info!("No new posts found");
        return Ok(0);
    }

    if notify_posts(notifier, &new_posts, &settings.target_url).await {
        info!(
            "Successfully sent notification for {} new posts",
            new_posts.len()
        );
    } else {
        error!("Failed to send email notification");
    }

    info!("New posts found:");
    for post in &new_posts {
        let date = post
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "Unknown date".to_string());
        info!("  - {} ({})", post.title, date);
    }
    Ok(new_posts.len())
}
