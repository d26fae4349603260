//! Getter methods for `CrawlConfig`

use std::path::Path;
use std::time::Duration;

use super::types::{CrawlConfig, RetryPolicy};

impl CrawlConfig {
    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }

    #[must_use]
    pub fn readiness_timeout(&self) -> Duration {
        self.readiness_timeout
    }

    #[must_use]
    pub fn readiness_selectors(&self) -> &[String] {
        &self.readiness_selectors
    }

    #[must_use]
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    #[must_use]
    pub fn product_limit(&self) -> usize {
        self.product_limit
    }

    #[must_use]
    pub fn max_concurrent_crawls(&self) -> usize {
        self.max_concurrent_crawls
    }

    #[must_use]
    pub fn chrome_data_dir(&self) -> Option<&Path> {
        self.chrome_data_dir.as_deref()
    }

    #[must_use]
    pub fn vision_enrichment(&self) -> bool {
        self.vision_enrichment
    }
}
