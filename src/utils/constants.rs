//! Shared configuration constants for storefront crawling
//!
//! Default values used by the config builder and the extractors so the
//! numbers live in exactly one place.

/// Chrome user agent string presented by every crawl session
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Default viewport: desktop 1080p
pub const DEFAULT_VIEWPORT: (u32, u32) = (1920, 1080);

/// Default timeout for a single `goto` attempt, in seconds
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 30;

/// Default budget for the readiness poll, in seconds
pub const DEFAULT_READINESS_TIMEOUT_SECS: u64 = 10;

/// Interval between readiness polls
pub const READINESS_POLL_INTERVAL_MS: u64 = 100;

/// Navigation attempts before a crawl is declared failed
pub const DEFAULT_MAX_NAVIGATION_ATTEMPTS: u32 = 3;

/// First backoff delay; doubles on each further attempt
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1_000;

/// Upper bound for a single backoff delay
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 16_000;

/// Hard cap on product listings returned for one page
pub const MAX_PRODUCTS_PER_PAGE: usize = 20;

/// Minimum rendered edge (inclusive) for the last-resort image heuristic
pub const MIN_PRODUCT_IMAGE_EDGE: u32 = 100;

/// Minimum rendered width (exclusive) for images nested in a product container
pub const MIN_CONTAINER_IMAGE_WIDTH: u32 = 50;

/// Default number of crawls allowed in flight at once
pub const DEFAULT_MAX_CONCURRENT_CRAWLS: usize = 4;

/// Default readiness selectors: any one present means the page rendered
pub const DEFAULT_READINESS_SELECTORS: &[&str] = &["img", "body"];
