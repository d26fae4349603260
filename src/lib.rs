pub mod browser_setup;
pub mod collaborators;
pub mod config;
pub mod crawl_service;
pub mod crawl_types;
pub mod normalizer;
pub mod page_extractor;
pub mod page_session;
pub mod product_agent;
pub mod utils;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use collaborators::{
    BannerGenerator, ObjectStore, ProductRepository, VisionModel, storage_key, storage_key_at,
};
pub use config::{CrawlConfig, CrawlConfigBuilder, RetryPolicy};
pub use crawl_service::CrawlService;
pub use crawl_types::{Artifact, CrawlError, CrawlResult};
pub use normalizer::{
    CanonicalProduct, CrawlResponse, FIELD_MAP, RawProductRecord, normalize, parse_price,
};
pub use page_extractor::schema::*;
pub use page_extractor::{ExtractContext, extract_page};
pub use page_session::{
    ChromeDriver, ChromeLauncher, DriverFactory, NavigationResponse, PageDriver, PageSession,
    PageSnapshot,
};
pub use product_agent::{
    AgentState, ExtractionPrompt, ProductAgent, ProductIndustry, TemplateStyle, ValidatedPage,
};

/// Crawl one product page with a locally launched Chrome
///
/// # Errors
///
/// Browser failures. Page failures are reported inside the returned
/// `CrawlResponse` as `{"error": ...}`.
pub async fn crawl_product(config: CrawlConfig, url: &str) -> CrawlResult<CrawlResponse> {
    CrawlService::new(config).crawl(url).await
}
