//! Core configuration types for product crawling
//!
//! This module contains the `CrawlConfig` struct and the `RetryPolicy` that
//! governs navigation backoff. Everything a crawl needs to know is carried here
//! explicitly; nothing is read from process-wide state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration struct for a product crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    pub(crate) headless: bool,
    pub(crate) viewport: (u32, u32),
    pub(crate) user_agent: String,

    /// Timeout for a single `goto` attempt
    ///
    /// Default: 30 seconds
    pub(crate) navigation_timeout: Duration,

    /// Budget for the content readiness poll
    ///
    /// When it elapses the readiness check reports `false`; it never errors.
    ///
    /// Default: 10 seconds
    pub(crate) readiness_timeout: Duration,

    /// Selectors whose presence signals that the page rendered.
    /// Any one of them is enough.
    pub(crate) readiness_selectors: Vec<String>,

    pub(crate) retry: RetryPolicy,

    /// Hard cap on product listings per page
    pub(crate) product_limit: usize,

    /// Crawls allowed in flight at once for batch crawling
    pub(crate) max_concurrent_crawls: usize,

    /// Chrome profile directory. `None` means a fresh per-session temp dir.
    pub(crate) chrome_data_dir: Option<PathBuf>,

    /// Screenshot the page and merge vision-model output into the product
    pub(crate) vision_enrichment: bool,
}

/// Exponential backoff settings for navigation retries
///
/// Delay before retry `n` (0-based) is `initial_delay * backoff_multiplier^n`,
/// capped at `max_delay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total navigation attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Backoff multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum retry delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        use crate::utils::constants::{
            DEFAULT_INITIAL_BACKOFF_MS, DEFAULT_MAX_BACKOFF_MS, DEFAULT_MAX_NAVIGATION_ATTEMPTS,
        };

        Self {
            max_attempts: DEFAULT_MAX_NAVIGATION_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(DEFAULT_MAX_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Calculate delay for given attempt number (0-based)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = self.backoff_multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let delay_ms = (self.initial_delay.as_millis() as f64 * multiplier) as u64;
        let delay = Duration::from_millis(delay_ms);

        // Cap at max_delay
        if delay > self.max_delay {
            self.max_delay
        } else {
            delay
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        super::builder::CrawlConfigBuilder::default().into_config()
    }
}
