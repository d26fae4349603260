//! Core types for product crawling operations.
//!
//! This module contains the error taxonomy shared by every stage of the
//! pipeline together with the names of the artifacts a crawl must produce.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Message shown to callers when a page never became usable
pub const CONTENT_NOT_LOADED_MESSAGE: &str = "Content did not load successfully.";

/// Message shown to callers when a required artifact is missing
pub const MISSING_ARTIFACT_MESSAGE: &str = "Failed to extract required information.";

/// The three artifacts a crawl must extract before normalization may run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    Product,
    Headers,
    Metadata,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product => write!(f, "product information"),
            Self::Headers => write!(f, "headers"),
            Self::Metadata => write!(f, "metadata"),
        }
    }
}

/// Error type for crawl operations
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Every navigation attempt failed
    #[error("Failed to navigate to {url} after {attempts} attempts: {last_error}")]
    NavigationFailed {
        url: String,
        attempts: u32,
        last_error: String,
    },

    /// Navigation succeeded but no readiness signal appeared in time
    #[error("Content did not load within {0:?}")]
    ContentNotLoaded(Duration),

    /// An extractor came back empty
    #[error("Failed to extract {0}")]
    MissingArtifact(Artifact),

    /// Browser launch, page creation or CDP failure
    #[error("Browser error: {0}")]
    Browser(String),

    /// The vision model answered with something that is not a JSON object
    #[error("Invalid model response for product data: {0}")]
    InvalidModelResponse(String),

    /// The vision model call itself failed
    #[error("Model request failed: {0}")]
    Model(String),

    /// Object storage upload failed
    #[error("Storage upload failed: {0}")]
    Storage(String),

    /// Persistence layer rejected the record
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The crawl task was cancelled or aborted before finishing
    #[error("Crawl operation was cancelled")]
    Cancelled,
}

impl From<anyhow::Error> for CrawlError {
    fn from(err: anyhow::Error) -> Self {
        // Use {:#} to preserve full error chain with context
        Self::Browser(format!("{err:#}"))
    }
}

impl CrawlError {
    /// The single-level message surfaced to callers in `{"error": ...}`
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NavigationFailed { .. } | Self::ContentNotLoaded(_) => {
                CONTENT_NOT_LOADED_MESSAGE.to_string()
            }
            Self::MissingArtifact(_) => MISSING_ARTIFACT_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the failure came from the page itself rather than from a
    /// downstream collaborator. Page failures are reported as error payloads;
    /// collaborator failures are server-side errors.
    #[must_use]
    pub fn is_page_failure(&self) -> bool {
        matches!(
            self,
            Self::NavigationFailed { .. } | Self::ContentNotLoaded(_) | Self::MissingArtifact(_)
        )
    }
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;
