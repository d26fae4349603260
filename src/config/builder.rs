//! Fluent builder for `CrawlConfig`
//!
//! All fields have defaults matching a desktop Chrome session; `build()`
//! validates the combination before handing out a config.

use anyhow::{Result, anyhow};
use std::path::PathBuf;
use std::time::Duration;

use super::types::{CrawlConfig, RetryPolicy};
use crate::utils::constants::{
    CHROME_USER_AGENT, DEFAULT_MAX_CONCURRENT_CRAWLS, DEFAULT_NAVIGATION_TIMEOUT_SECS,
    DEFAULT_READINESS_SELECTORS, DEFAULT_READINESS_TIMEOUT_SECS, DEFAULT_VIEWPORT,
    MAX_PRODUCTS_PER_PAGE,
};

#[derive(Debug, Clone)]
pub struct CrawlConfigBuilder {
    pub(crate) headless: bool,
    pub(crate) viewport: (u32, u32),
    pub(crate) user_agent: String,
    pub(crate) navigation_timeout: Duration,
    pub(crate) readiness_timeout: Duration,
    pub(crate) readiness_selectors: Vec<String>,
    pub(crate) retry: RetryPolicy,
    pub(crate) product_limit: usize,
    pub(crate) max_concurrent_crawls: usize,
    pub(crate) chrome_data_dir: Option<PathBuf>,
    pub(crate) vision_enrichment: bool,
}

impl Default for CrawlConfigBuilder {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: DEFAULT_VIEWPORT,
            user_agent: CHROME_USER_AGENT.to_string(),
            navigation_timeout: Duration::from_secs(DEFAULT_NAVIGATION_TIMEOUT_SECS),
            readiness_timeout: Duration::from_secs(DEFAULT_READINESS_TIMEOUT_SECS),
            readiness_selectors: DEFAULT_READINESS_SELECTORS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            retry: RetryPolicy::default(),
            product_limit: MAX_PRODUCTS_PER_PAGE,
            max_concurrent_crawls: DEFAULT_MAX_CONCURRENT_CRAWLS,
            chrome_data_dir: None,
            vision_enrichment: false,
        }
    }
}

impl CrawlConfig {
    /// Create a builder for configuring a `CrawlConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> CrawlConfigBuilder {
        CrawlConfigBuilder::default()
    }
}

impl CrawlConfigBuilder {
    /// Validate and produce the config
    ///
    /// # Errors
    ///
    /// Fails when a timeout or limit is zero, the viewport is degenerate, no
    /// readiness selector is configured, or a readiness selector does not parse.
    pub fn build(self) -> Result<CrawlConfig> {
        if self.retry.max_attempts == 0 {
            return Err(anyhow!("retry.max_attempts must be at least 1"));
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(anyhow!(
                "retry.backoff_multiplier must be >= 1.0, got {}",
                self.retry.backoff_multiplier
            ));
        }
        if self.navigation_timeout.is_zero() {
            return Err(anyhow!("navigation_timeout must be non-zero"));
        }
        if self.readiness_timeout.is_zero() {
            return Err(anyhow!("readiness_timeout must be non-zero"));
        }
        if self.viewport.0 == 0 || self.viewport.1 == 0 {
            return Err(anyhow!("viewport must be non-empty, got {:?}", self.viewport));
        }
        if self.product_limit == 0 || self.product_limit > MAX_PRODUCTS_PER_PAGE {
            return Err(anyhow!(
                "product_limit must be between 1 and {MAX_PRODUCTS_PER_PAGE}, got {}",
                self.product_limit
            ));
        }
        if self.max_concurrent_crawls == 0 {
            return Err(anyhow!("max_concurrent_crawls must be at least 1"));
        }
        if self.readiness_selectors.is_empty() {
            return Err(anyhow!("at least one readiness selector is required"));
        }
        for selector in &self.readiness_selectors {
            scraper::Selector::parse(selector)
                .map_err(|e| anyhow!("Invalid readiness selector '{selector}': {e}"))?;
        }

        // Enforce headless mode in release builds for production safety
        #[cfg(not(debug_assertions))]
        let headless = if !self.headless {
            tracing::warn!(
                "Forcing headless mode in release build. \
                Headed mode is only available in debug builds for development."
            );
            true
        } else {
            self.headless
        };

        #[cfg(debug_assertions)]
        let headless = self.headless;

        Ok(CrawlConfig { headless, ..self.into_config() })
    }

    pub(crate) fn into_config(self) -> CrawlConfig {
        CrawlConfig {
            headless: self.headless,
            viewport: self.viewport,
            user_agent: self.user_agent,
            navigation_timeout: self.navigation_timeout,
            readiness_timeout: self.readiness_timeout,
            readiness_selectors: self.readiness_selectors,
            retry: self.retry,
            product_limit: self.product_limit,
            max_concurrent_crawls: self.max_concurrent_crawls,
            chrome_data_dir: self.chrome_data_dir,
            vision_enrichment: self.vision_enrichment,
        }
    }
}
