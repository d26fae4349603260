//! Test utilities for the storefront_crawl test suite
//!
//! `ScriptedDriver` stands in for Chrome: every navigation answer, the page
//! HTML and the readiness selectors are fixed up front, and the test keeps
//! handles to observe goto calls and teardown.

#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use storefront_crawl::collaborators::{
    BannerGenerator, ObjectStore, ProductRepository, VisionModel,
};
use storefront_crawl::page_extractor::js_scripts::READY_STATE_SCRIPT;
use storefront_crawl::{
    CanonicalProduct, CrawlConfig, CrawlConfigBuilder, DriverFactory, NavigationResponse,
    PageDriver, RetryPolicy,
};

/// Route test logs through `RUST_LOG` once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builder with millisecond backoff and a short readiness budget
pub fn fast_builder() -> CrawlConfigBuilder {
    CrawlConfig::builder()
        .retry_policy(RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(5),
        })
        .navigation_timeout(Duration::from_secs(2))
        .readiness_timeout(Duration::from_millis(300))
}

pub fn fast_config() -> CrawlConfig {
    fast_builder().build().expect("test config is valid")
}

/// Minimal HTML document around `body`
pub fn create_test_html(title: &str, head: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{}</title>
    {}
</head>
<body>
    {}
</body>
</html>"#,
        html_escape::encode_text(title),
        head,
        body
    )
}

/// Product grid with `count` `.product-card` items named `Item 0..count`
pub fn product_grid(count: usize) -> String {
    (0..count)
        .map(|i| {
            format!(
                r#"<div class="product-card" data-product-id="sku-{i}">
                    <img src="/img/{i}.jpg" width="300" height="300" alt="Item {i}">
                    <h3>{}</h3>
                    <span class="price">${i}.99</span>
                </div>"#,
                html_escape::encode_text(&format!("Item {i}"))
            )
        })
        .collect()
}

/// A complete single-product page: one product, headings and metadata
pub fn product_page_html() -> String {
    create_test_html(
        "Trail Runner | Shoe Store",
        r#"<meta name="description" content="Buy shoes">
           <meta property="og:title" content="Shoe Store">
           <link rel="canonical" href="https://shoes.test/p/trail-runner">"#,
        r#"<header><a href="/new">New in</a><a href="/sale">Sale</a></header>
           <h1>Trail Runner</h1>
           <h2>Details</h2>
           <div class="product" data-product-id="tr-1">
               <img src="/img/trail-runner.jpg" width="800" height="800" alt="Trail Runner">
               <h3>Trail Runner</h3>
               <span class="regular-price">$19.99</span>
               <span class="sale-price">$14.99</span>
               <p class="description">Light trail shoe.</p>
               <span class="stock">Only 3 left in stock</span>
           </div>"#,
    )
}

/// What the scripted page does
#[derive(Debug, Clone)]
pub struct PageScript {
    /// Answer per `goto` call; the last entry repeats. `Err` throws.
    pub statuses: Vec<std::result::Result<i64, String>>,
    pub html: String,
    pub url: Option<String>,
    /// Selectors `has_selector` reports as present
    pub present: Vec<String>,
    pub probe: Option<serde_json::Value>,
    pub screenshot: Vec<u8>,
    /// URLs whose navigation always answers 503, whatever `statuses` says
    pub fail_urls: Vec<String>,
}

impl PageScript {
    /// A page answering 200 with `html`, `img` and `body` present
    pub fn loaded(html: impl Into<String>) -> Self {
        Self {
            statuses: vec![Ok(200)],
            html: html.into(),
            url: Some("https://shoes.test/p/trail-runner".into()),
            present: vec!["img".into(), "body".into()],
            probe: None,
            screenshot: vec![0x89, b'P', b'N', b'G'],
            fail_urls: Vec::new(),
        }
    }

    /// A page whose every navigation fails with `status`
    pub fn failing(status: i64) -> Self {
        Self {
            statuses: vec![Ok(status)],
            ..Self::loaded("")
        }
    }
}

/// Observation handles shared between a driver and its test
#[derive(Debug, Clone, Default)]
pub struct DriverProbe {
    pub goto_calls: Arc<AtomicUsize>,
    pub closed: Arc<AtomicBool>,
}

impl DriverProbe {
    pub fn goto_calls(&self) -> usize {
        self.goto_calls.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct ScriptedDriver {
    script: PageScript,
    probe: DriverProbe,
}

impl ScriptedDriver {
    pub fn new(script: PageScript) -> (Self, DriverProbe) {
        let probe = DriverProbe::default();
        (
            Self {
                script,
                probe: probe.clone(),
            },
            probe,
        )
    }
}

#[async_trait]
impl PageDriver for ScriptedDriver {
    async fn goto(&self, url: &str) -> Result<NavigationResponse> {
        let call = self.probe.goto_calls.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_urls.iter().any(|u| u == url) {
            return Ok(NavigationResponse::with_status(503));
        }
        let answer = self
            .script
            .statuses
            .get(call)
            .or_else(|| self.script.statuses.last())
            .cloned()
            .unwrap_or(Err("no scripted answer".into()));
        match answer {
            Ok(status) => Ok(NavigationResponse::with_status(status)),
            Err(message) => bail!("{message}"),
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        if script == READY_STATE_SCRIPT {
            return Ok(serde_json::json!({"readyState": "complete", "bodyExists": true}));
        }
        match &self.script.probe {
            Some(probe) => Ok(probe.clone()),
            None => bail!("probe not scripted"),
        }
    }

    async fn has_selector(&self, selector: &str) -> Result<bool> {
        Ok(self.script.present.iter().any(|s| s == selector))
    }

    async fn html(&self) -> Result<String> {
        Ok(self.script.html.clone())
    }

    async fn current_url(&self) -> Result<Option<String>> {
        Ok(self.script.url.clone())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(self.script.screenshot.clone())
    }

    async fn close(&mut self) -> Result<()> {
        self.probe.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Observation handles for every driver a factory opened
#[derive(Debug, Clone, Default)]
pub struct FactoryProbe {
    opened: Arc<AtomicUsize>,
    drivers: Arc<Mutex<Vec<DriverProbe>>>,
}

impl FactoryProbe {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn drivers(&self) -> Vec<DriverProbe> {
        self.drivers.lock().unwrap().clone()
    }

    pub fn total_goto_calls(&self) -> usize {
        self.drivers().iter().map(DriverProbe::goto_calls).sum()
    }

    pub fn all_closed(&self) -> bool {
        self.drivers().iter().all(DriverProbe::closed)
    }
}

/// Hands out one scripted driver per crawl, chosen by launch order
pub struct ScriptedFactory {
    scripts: Mutex<Vec<PageScript>>,
    probe: FactoryProbe,
}

impl ScriptedFactory {
    pub fn new(scripts: Vec<PageScript>) -> Self {
        Self {
            scripts: Mutex::new(scripts),
            probe: FactoryProbe::default(),
        }
    }

    /// Same page for every crawl
    pub fn repeating(script: PageScript) -> Self {
        Self::new(vec![script])
    }

    /// Handle that stays valid after the factory moves into a service
    pub fn probe(&self) -> FactoryProbe {
        self.probe.clone()
    }
}

#[async_trait]
impl DriverFactory for ScriptedFactory {
    type Driver = ScriptedDriver;

    async fn open(&self, _config: &CrawlConfig) -> Result<ScriptedDriver> {
        self.probe.opened.fetch_add(1, Ordering::SeqCst);
        let script = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.len() {
                0 => bail!("no scripted pages left"),
                1 => scripts[0].clone(),
                _ => scripts.remove(0),
            }
        };
        let (driver, probe) = ScriptedDriver::new(script);
        self.probe.drivers.lock().unwrap().push(probe);
        Ok(driver)
    }
}

/// Vision model answering with fixed text and recording the instruction
#[derive(Default)]
pub struct StaticVisionModel {
    pub answer: String,
    pub instructions: Mutex<Vec<String>>,
}

impl StaticVisionModel {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            instructions: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VisionModel for StaticVisionModel {
    async fn generate(&self, image_png: &[u8], instruction: &str) -> Result<String> {
        assert!(!image_png.is_empty(), "vision model needs a screenshot");
        self.instructions.lock().unwrap().push(instruction.to_string());
        Ok(self.answer.clone())
    }
}

pub struct FixedBanner;

#[async_trait]
impl BannerGenerator for FixedBanner {
    async fn generate(&self, _product: &CanonicalProduct) -> Result<Vec<u8>> {
        Ok(vec![0x89, b'P', b'N', b'G', 1, 2, 3])
    }
}

/// Object store keeping uploads in memory; `fail` makes every put error
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<Vec<(String, Vec<u8>, String)>>,
    pub fail: bool,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> Result<String> {
        if self.fail {
            bail!("access denied");
        }
        self.objects
            .lock()
            .unwrap()
            .push((key.to_string(), bytes, content_type.to_string()));
        Ok(format!("https://cdn.test/{key}"))
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    pub saved: Mutex<Vec<CanonicalProduct>>,
}

#[async_trait]
impl ProductRepository for MemoryRepository {
    async fn save(&self, product: &CanonicalProduct) -> Result<String> {
        let mut saved = self.saved.lock().unwrap();
        saved.push(product.clone());
        Ok(format!("product-{}", saved.len()))
    }
}
