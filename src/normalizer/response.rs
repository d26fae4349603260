//! The payload a crawl hands back to its caller

use serde::{Deserialize, Serialize};

use super::CanonicalProduct;
use crate::crawl_types::{CrawlError, CrawlResult};
use crate::page_extractor::schema::{Headers, PageMetadata};

/// `{banner_url, headers, metadata, product_info}` or `{"error": message}`
///
/// The error form carries a single human-readable message and nothing else;
/// callers branch on the presence of the `error` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CrawlResponse {
    Success {
        banner_url: String,
        headers: Headers,
        metadata: PageMetadata,
        product_info: CanonicalProduct,
    },
    Error {
        error: String,
    },
}

impl CrawlResponse {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// The message of an error payload
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { error } => Some(error),
            Self::Success { .. } => None,
        }
    }

    /// The canonical product, when the crawl succeeded
    #[must_use]
    pub fn product(&self) -> Option<&CanonicalProduct> {
        match self {
            Self::Success { product_info, .. } => Some(product_info),
            Self::Error { .. } => None,
        }
    }
}

impl From<CrawlError> for CrawlResponse {
    fn from(err: CrawlError) -> Self {
        Self::error(err.user_message())
    }
}

impl From<CrawlResult<CrawlResponse>> for CrawlResponse {
    fn from(result: CrawlResult<CrawlResponse>) -> Self {
        result.unwrap_or_else(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl_types::Artifact;

    #[test]
    fn failures_become_single_key_payloads() {
        let response = CrawlResponse::from(CrawlError::MissingArtifact(Artifact::Metadata));
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"error":"Failed to extract required information."}"#
        );
        assert!(response.product().is_none());
    }

    #[test]
    fn success_shape() {
        let response = CrawlResponse::from(Ok(CrawlResponse::Success {
            banner_url: String::new(),
            headers: Headers::new(),
            metadata: PageMetadata::default(),
            product_info: CanonicalProduct::default(),
        }));
        let json = serde_json::to_value(&response).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["banner_url", "headers", "metadata", "product_info"]);
        assert_eq!(json["metadata"]["metadata"]["schema_org"], serde_json::Value::Null);

        let parsed: CrawlResponse = serde_json::from_value(json).unwrap();
        assert!(!parsed.is_error());
    }
}
