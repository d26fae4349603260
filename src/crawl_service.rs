//! Crawl entry points: one URL, or many with bounded concurrency
//!
//! Each crawl gets its own browser through the `DriverFactory`, runs the
//! product agent inside a scoped page session, normalizes the result and
//! hands it to the optional banner and persistence collaborators.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{Instrument, Span, error, info, info_span, warn};

use crate::collaborators::{
    BannerGenerator, ObjectStore, ProductRepository, VisionModel, storage_key,
};
use crate::config::CrawlConfig;
use crate::crawl_types::{CrawlError, CrawlResult};
use crate::normalizer::{CanonicalProduct, CrawlResponse, normalize};
use crate::page_session::{ChromeLauncher, DriverFactory, PageSession};
use crate::product_agent::{ExtractionPrompt, ProductAgent, ValidatedPage};

/// Banner rendering plus the store the banner is uploaded to
struct BannerPublisher {
    generator: Arc<dyn BannerGenerator>,
    store: Arc<dyn ObjectStore>,
    platform: String,
}

pub struct CrawlService<F: DriverFactory = ChromeLauncher> {
    config: CrawlConfig,
    factory: F,
    vision: Option<Arc<dyn VisionModel>>,
    prompt: ExtractionPrompt,
    banner: Option<BannerPublisher>,
    repository: Option<Arc<dyn ProductRepository>>,
}

impl CrawlService<ChromeLauncher> {
    /// Service launching a local Chrome per crawl
    #[must_use]
    pub fn new(config: CrawlConfig) -> Self {
        Self::with_factory(config, ChromeLauncher)
    }
}

impl<F: DriverFactory> CrawlService<F> {
    #[must_use]
    pub fn with_factory(config: CrawlConfig, factory: F) -> Self {
        Self {
            config,
            factory,
            vision: None,
            prompt: ExtractionPrompt::default(),
            banner: None,
            repository: None,
        }
    }

    /// Vision model for enrichment; used only while `vision_enrichment` is on
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

    /// Render a banner per product and upload it; its URL becomes `banner_url`
    #[must_use]
    pub fn with_banner_publisher(
        mut self,
        generator: Arc<dyn BannerGenerator>,
        store: Arc<dyn ObjectStore>,
        platform: impl Into<String>,
    ) -> Self {
        self.banner = Some(BannerPublisher {
            generator,
            store,
            platform: platform.into(),
        });
        self
    }

    #[must_use]
    pub fn with_repository(mut self, repository: Arc<dyn ProductRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    fn agent(&self, span: Span) -> ProductAgent {
        let agent = ProductAgent::new(span).with_prompt(self.prompt.clone());
        match &self.vision {
            Some(model) if self.config.vision_enrichment() => {
                agent.with_vision_model(Arc::clone(model))
            }
            _ => agent,
        }
    }

    /// Crawl `url` up to a validated page, without normalizing
    ///
    /// # Errors
    ///
    /// Browser launch failures and every error of `ProductAgent::run`.
    pub async fn crawl_page(&self, url: &str) -> CrawlResult<ValidatedPage> {
        let span = info_span!("crawl", url = %url);
        self.crawl_page_in(url, span.clone()).instrument(span).await
    }

    async fn crawl_page_in(&self, url: &str, span: Span) -> CrawlResult<ValidatedPage> {
        let agent = self.agent(span.clone());
        let driver = self.factory.open(&self.config).await?;
        let session = PageSession::new(driver, self.config.clone(), span);
        session
            .run_scoped(async |session| agent.run(session, url).await)
            .await
    }

    /// Crawl `url` into a response payload
    ///
    /// Page failures (navigation, readiness, missing artifacts) come back as
    /// `Ok(CrawlResponse::Error)`. Browser, model, storage and persistence
    /// failures are returned as `Err` for the caller to report.
    ///
    /// # Errors
    ///
    /// Any `CrawlError` that is not a page failure.
    pub async fn crawl(&self, url: &str) -> CrawlResult<CrawlResponse> {
        let span = info_span!("crawl", url = %url);
        let outcome = async {
            let page = self.crawl_page_in(url, Span::current()).await?;
            let product = normalize(page.product, &page.headers, &page.metadata);
            let banner_url = self.publish_banner(&product).await?;
            self.persist(&product).await?;

            Ok::<_, CrawlError>(CrawlResponse::Success {
                banner_url,
                headers: page.headers,
                metadata: page.metadata,
                product_info: product,
            })
        }
        .instrument(span.clone())
        .await;

        match outcome {
            Err(e) if e.is_page_failure() => {
                warn!(parent: &span, "Crawl of {} produced no product: {}", url, e);
                Ok(CrawlResponse::from(e))
            }
            other => other,
        }
    }

    async fn publish_banner(&self, product: &CanonicalProduct) -> CrawlResult<String> {
        let Some(publisher) = &self.banner else {
            return Ok(String::new());
        };

        let png = publisher
            .generator
            .generate(product)
            .await
            .map_err(|e| CrawlError::Model(format!("{e:#}")))?;
        let key = storage_key(product.display_name(), &publisher.platform);
        let url = publisher
            .store
            .put(png, &key, "image/png")
            .await
            .map_err(|e| CrawlError::Storage(format!("{e:#}")))?;

        info!("Uploaded banner to {}", url);
        Ok(url)
    }

    async fn persist(&self, product: &CanonicalProduct) -> CrawlResult<()> {
        if let Some(repository) = &self.repository {
            let id = repository
                .save(product)
                .await
                .map_err(|e| CrawlError::Persistence(format!("{e:#}")))?;
            info!("Saved product {} as {}", product.product_id, id);
        }
        Ok(())
    }

    /// Crawl every URL, at most `max_concurrent_crawls` at a time
    ///
    /// Results come back in input order, one per URL.
    pub async fn crawl_many<S: AsRef<str>>(&self, urls: &[S]) -> Vec<CrawlResult<CrawlResponse>> {
        let semaphore = Semaphore::new(self.config.max_concurrent_crawls().max(1));

        let mut pending: FuturesUnordered<_> = urls
            .iter()
            .enumerate()
            .map(|(index, url)| {
                let semaphore = &semaphore;
                async move {
                    let Ok(_permit) = semaphore.acquire().await else {
                        error!("Semaphore closed unexpectedly");
                        return (index, Err(CrawlError::Cancelled));
                    };
                    (index, self.crawl(url.as_ref()).await)
                }
            })
            .collect();

        let mut results: Vec<Option<CrawlResult<CrawlResponse>>> =
            std::iter::repeat_with(|| None).take(urls.len()).collect();
        while let Some((index, result)) = pending.next().await {
            results[index] = Some(result);
        }

        results
            .into_iter()
            .map(|result| result.unwrap_or(Err(CrawlError::Cancelled)))
            .collect()
    }
}
