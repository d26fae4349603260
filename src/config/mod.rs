//! Configuration module for product crawling
//!
//! This module provides the `CrawlConfig` struct and its builder for
//! configuring crawl sessions with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::CrawlConfigBuilder;
pub use types::{CrawlConfig, RetryPolicy};
