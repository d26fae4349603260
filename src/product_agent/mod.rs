//! Product page agent
//!
//! Drives one page through `Navigating -> ContentCheck -> Extracting ->
//! Validated`. Any state can end the crawl: navigation exhaustion, a page
//! that never shows content, or a missing product, headers or metadata
//! artifact. Nothing partial is returned on failure.

mod prompt;

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{Span, debug, error, info};

pub use prompt::{ExtractionPrompt, ProductIndustry, PromptField, TemplateStyle};

use crate::collaborators::VisionModel;
use crate::crawl_types::{Artifact, CrawlError, CrawlResult};
use crate::normalizer::RawProductRecord;
use crate::page_extractor::extract_page;
use crate::page_extractor::schema::{
    Headers, PageExtraction, PageMetadata, ProductListing, StorefrontDetails,
};
use crate::page_session::{PageDriver, PageSession};
use crate::utils::safe_truncate_chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentState {
    Navigating,
    ContentCheck,
    Extracting,
    Validated,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Navigating => "navigating",
            Self::ContentCheck => "content_check",
            Self::Extracting => "extracting",
            Self::Validated => "validated",
        };
        f.write_str(name)
    }
}

/// Everything a validated product page produced
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPage {
    /// First listing on the page, with any model fields laid over it
    pub product: RawProductRecord,
    pub headers: Headers,
    pub metadata: PageMetadata,
    pub storefront: StorefrontDetails,
    /// Every listing found, in document order
    pub listings: Vec<ProductListing>,
}

/// Check the three required artifacts, in order: product, headers, metadata
///
/// # Errors
///
/// `CrawlError::MissingArtifact` naming the first artifact that came back empty.
pub fn validate(extraction: PageExtraction) -> CrawlResult<ValidatedPage> {
    let PageExtraction {
        products,
        headers,
        metadata,
        storefront,
    } = extraction;

    let Some(first) = products.first().cloned() else {
        return Err(CrawlError::MissingArtifact(Artifact::Product));
    };
    if headers.is_empty() {
        return Err(CrawlError::MissingArtifact(Artifact::Headers));
    }
    let Some(metadata) = metadata.filter(|m| !m.is_empty()) else {
        return Err(CrawlError::MissingArtifact(Artifact::Metadata));
    };

    Ok(ValidatedPage {
        product: RawProductRecord::from(first),
        headers,
        metadata,
        storefront,
        listings: products,
    })
}

/// Parse a model answer into product fields
///
/// Markdown code fences around the JSON are tolerated.
///
/// # Errors
///
/// `CrawlError::InvalidModelResponse` when the text is not a JSON object.
pub fn parse_model_response(text: &str) -> CrawlResult<Map<String, Value>> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(CrawlError::InvalidModelResponse(format!(
            "expected a JSON object, got {}",
            match other {
                Value::Null => "null",
                Value::Bool(_) => "a boolean",
                Value::Number(_) => "a number",
                Value::String(_) => "a string",
                Value::Array(_) => "an array",
                Value::Object(_) => "an object",
            }
        ))),
        Err(e) => Err(CrawlError::InvalidModelResponse(e.to_string())),
    }
}

pub struct ProductAgent {
    span: Span,
    vision: Option<Arc<dyn VisionModel>>,
    prompt: ExtractionPrompt,
}

impl ProductAgent {
    /// Agent logging into `span`
    #[must_use]
    pub fn new(span: Span) -> Self {
        Self {
            span,
            vision: None,
            prompt: ExtractionPrompt::default(),
        }
    }

    /// Enrich the product with fields read from a page screenshot
    #[must_use]
    pub fn with_vision_model(mut self, model: Arc<dyn VisionModel>) -> Self {
        self.vision = Some(model);
        self
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: ExtractionPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn prompt(&self) -> &ExtractionPrompt {
        &self.prompt
    }

    fn enter(&self, state: &mut AgentState, next: AgentState) {
        debug!(parent: &self.span, "Agent state {} -> {}", state, next);
        *state = next;
    }

    /// Crawl `url` in `session` up to a validated page
    ///
    /// # Errors
    ///
    /// * `NavigationFailed` when every navigation attempt failed
    /// * `ContentNotLoaded` when no readiness selector appeared
    /// * `MissingArtifact` when product, headers or metadata is missing
    /// * `Model` / `InvalidModelResponse` from vision enrichment
    pub async fn run<D: PageDriver>(
        &self,
        session: &PageSession<D>,
        url: &str,
    ) -> CrawlResult<ValidatedPage> {
        let mut state = AgentState::Navigating;
        let outcome = self.advance(session, url, &mut state).await;

        match &outcome {
            Ok(page) => info!(
                parent: &self.span,
                "Validated product page {} ({} listings)",
                url,
                page.listings.len()
            ),
            Err(e) => error!(parent: &self.span, "Crawl of {} failed while {}: {}", url, state, e),
        }
        outcome
    }

    async fn advance<D: PageDriver>(
        &self,
        session: &PageSession<D>,
        url: &str,
        state: &mut AgentState,
    ) -> CrawlResult<ValidatedPage> {
        session.navigate(url).await?;

        self.enter(state, AgentState::ContentCheck);
        if !session.content_ready().await {
            return Err(CrawlError::ContentNotLoaded(
                session.config().readiness_timeout(),
            ));
        }

        self.enter(state, AgentState::Extracting);
        let snapshot = session.snapshot().await?;
        let limit = session.config().product_limit();
        let extraction = self.span.in_scope(|| extract_page(&snapshot, limit));
        let mut page = validate(extraction)?;

        if let Some(model) = &self.vision {
            page.product = self
                .enrich(session, model.as_ref(), page.product)
                .await?;
        }

        self.enter(state, AgentState::Validated);
        Ok(page)
    }

    async fn enrich<D: PageDriver>(
        &self,
        session: &PageSession<D>,
        model: &dyn VisionModel,
        product: RawProductRecord,
    ) -> CrawlResult<RawProductRecord> {
        let screenshot = session.screenshot().await?;
        debug!(parent: &self.span, "Sending {} byte screenshot to vision model", screenshot.len());

        let answer = model
            .generate(&screenshot, &self.prompt.render())
            .await
            .map_err(|e| CrawlError::Model(format!("{e:#}")))?;
        debug!(parent: &self.span, "Vision model answered: {}", safe_truncate_chars(&answer, 200));
        let fields = parse_model_response(&answer)?;

        debug!(parent: &self.span, "Vision model supplied {} fields", fields.len());
        Ok(product.merged_with(fields))
    }
}
