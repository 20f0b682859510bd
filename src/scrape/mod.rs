// src/scrape/mod.rs
pub mod date;
pub mod extract;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::Settings;

pub use date::{parse_date, try_parse_date};
pub use extract::PostExtractor;

/// Something that yields the raw markup of the monitored page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self) -> Result<String>;
    fn location(&self) -> &str;
}

/// Live page over HTTP(S).
pub struct HttpPageSource {
    url: String,
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("building http client")?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.target_url.clone(),
            &settings.user_agent,
            settings.fetch_timeout,
        )
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self) -> Result<String> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {}", self.url))?;
        let resp = resp
            .error_for_status()
            .with_context(|| format!("HTTP error from {}", self.url))?;
        resp.text().await.context("reading page body")
    }

    fn location(&self) -> &str {
        &self.url
    }
}

/// Canned markup (tests, offline demos). `unreachable` simulates a network failure.
pub struct FixturePageSource {
    location: String,
    body: Option<String>,
}

impl FixturePageSource {
    pub fn from_fixture(body: &str) -> Self {
        Self {
            location: "fixture://page".to_string(),
            body: Some(body.to_string()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            location: "fixture://unreachable".to_string(),
            body: None,
        }
    }
}

#[async_trait]
impl PageSource for FixturePageSource {
    async fn fetch_page(&self) -> Result<String> {
        self.body
            .clone()
            .ok_or_else(|| anyhow!("connection refused: {}", self.location))
    }

    fn location(&self) -> &str {
        &self.location
    }
}
