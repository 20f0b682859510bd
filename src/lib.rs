// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod logging;
pub mod notify;
pub mod post;
pub mod scheduler;
pub mod scrape;
pub mod store;
pub mod tracker;

// ---- Re-exports for stable public API ----
pub use crate::config::Settings;
pub use crate::notify::{Digest, EmailNotifier, Notifier};
pub use crate::post::Post;
pub use crate::store::PostStore;
pub use crate::tracker::{run_check, Tracker};
