//! Setter methods for `CrawlConfigBuilder`

use std::path::PathBuf;
use std::time::Duration;

use super::builder::CrawlConfigBuilder;
use super::types::RetryPolicy;

impl CrawlConfigBuilder {
    /// Set browser headless mode
    ///
    /// **Headless mode is enforced in release builds.** Headed mode is only
    /// honoured in debug builds, for watching a crawl while developing
    /// extractors.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = (width, height);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn readiness_timeout(mut self, timeout: Duration) -> Self {
        self.readiness_timeout = timeout;
        self
    }

    /// Replace the readiness selectors. The page counts as ready as soon as
    /// any one of them matches.
    #[must_use]
    pub fn readiness_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.readiness_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Shorthand for changing only the attempt budget
    #[must_use]
    pub fn max_navigation_attempts(mut self, attempts: u32) -> Self {
        self.retry.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn product_limit(mut self, limit: usize) -> Self {
        self.product_limit = limit;
        self
    }

    #[must_use]
    pub fn max_concurrent_crawls(mut self, limit: usize) -> Self {
        self.max_concurrent_crawls = limit;
        self
    }

    #[must_use]
    pub fn chrome_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.chrome_data_dir = dir;
        self
    }

    #[must_use]
    pub fn vision_enrichment(mut self, enabled: bool) -> Self {
        self.vision_enrichment = enabled;
        self
    }
}
