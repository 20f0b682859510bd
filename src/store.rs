// src/store.rs
//! Known-post store: a single JSON document holding every post seen so far.
//!
//! Every mutation rewrites the whole file before returning. Write failures are
//! logged and swallowed; the in-memory copy stays authoritative for the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::post::Post;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreData {
    #[serde(default)]
    pub last_check: Option<DateTime<Utc>>,
    #[serde(default)]
    pub known_posts: Vec<Post>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreStats {
    pub total_posts: usize,
    pub last_check: Option<DateTime<Utc>>,
    pub data_file: PathBuf,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total known posts: {}", self.total_posts)?;
        match self.last_check {
            Some(ts) => writeln!(f, "Last check: {}", ts.to_rfc3339())?,
            None => writeln!(f, "Last check: Never")?,
        }
        write!(f, "Data file: {}", self.data_file.display())
    }
}

#[derive(Debug)]
pub struct PostStore {
    path: PathBuf,
    data: StoreData,
}

impl PostStore {
    /// Never fails: a missing or unreadable document starts an empty store.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let data = read_data(&path);
        Self { path, data }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }

    pub fn known_posts(&self) -> &[Post] {
        &self.data.known_posts
    }

    pub fn last_check(&self) -> Option<DateTime<Utc>> {
        self.data.last_check
    }

    /// Newest first.
    pub fn recent_posts(&self, n: usize) -> Vec<&Post> {
        self.data.known_posts.iter().rev().take(n).collect()
    }

    pub fn is_new_post(&self, post: &Post) -> bool {
        !self.data.known_posts.iter().any(|p| p.same_as(post))
    }

    /// Appends and persists unless an equal post (by identity) is already known.
    pub fn add_post(&mut self, post: Post) {
        if !self.is_new_post(&post) {
            return;
        }
        let title = post.title.clone();
        self.data.known_posts.push(post);
        self.save();
        tracing::info!("Added new post: {title}");
    }

    pub fn set_last_check(&mut self, ts: DateTime<Utc>) {
        self.data.last_check = Some(ts);
        self.save();
    }

    pub fn mark_checked(&mut self) {
        self.set_last_check(Utc::now());
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            total_posts: self.data.known_posts.len(),
            last_check: self.data.last_check,
            data_file: self.path.clone(),
        }
    }

    fn save(&self) {
        if let Err(e) = write_data(&self.path, &self.data) {
            tracing::error!(path = %self.path.display(), "Error saving data file: {e:#}");
        } else {
            tracing::debug!(path = %self.path.display(), "data saved");
        }
    }
}

fn read_data(path: &Path) -> StoreData {
    let raw = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no data file yet, starting empty");
            return StoreData::default();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "Error loading data file: {e}. Starting with empty data.");
            return StoreData::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Error loading data file: {e}. Starting with empty data.");
            StoreData::default()
        }
    }
}

fn write_data(path: &Path, data: &StoreData) -> anyhow::Result<()> {
    use anyhow::Context;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    // serde_json keeps non-ASCII as literal UTF-8
    let bytes = serde_json::to_vec_pretty(data).context("serializing store")?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}
