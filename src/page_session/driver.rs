//! Browser seam for page sessions
//!
//! `PageSession` talks to the browser only through `PageDriver`, which keeps
//! the retry and readiness logic independent of chromiumoxide.

use anyhow::Result;
use async_trait::async_trait;

use crate::config::CrawlConfig;

/// What the browser reported for the main document of a navigation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationResponse {
    /// HTTP status of the main document, when the browser saw one
    pub status: Option<i64>,
}

impl NavigationResponse {
    #[must_use]
    pub fn with_status(status: i64) -> Self {
        Self {
            status: Some(status),
        }
    }

    /// Statuses outside 200..=399 are navigation failures. A missing status
    /// (`file://`, `data:` or a cached document) counts as success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_none_or(|status| (200..=399).contains(&status))
    }
}

#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Load `url` and wait for the navigation to commit
    async fn goto(&self, url: &str) -> Result<NavigationResponse>;

    /// Evaluate a script and return its JSON value
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Whether at least one element matches `selector` right now
    async fn has_selector(&self, selector: &str) -> Result<bool>;

    /// Serialized DOM of the current page
    async fn html(&self) -> Result<String>;

    /// URL the page ended up on after redirects
    async fn current_url(&self) -> Result<Option<String>>;

    /// Full-page PNG screenshot
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Release the page and the browser behind it
    async fn close(&mut self) -> Result<()>;
}

/// Opens one fresh driver per crawl
#[async_trait]
pub trait DriverFactory: Send + Sync {
    type Driver: PageDriver;

    async fn open(&self, config: &CrawlConfig) -> Result<Self::Driver>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(NavigationResponse::with_status(200).is_success());
        assert!(NavigationResponse::with_status(301).is_success());
        assert!(NavigationResponse::default().is_success());
        assert!(!NavigationResponse::with_status(404).is_success());
        assert!(!NavigationResponse::with_status(503).is_success());
        assert!(!NavigationResponse::with_status(101).is_success());
    }
}
