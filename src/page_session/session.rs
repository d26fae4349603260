//! One browser page with retrying navigation and a bounded readiness poll

use anyhow::bail;
use std::time::{Duration, Instant};
use tracing::{Instrument, Span, debug, info, warn};

use super::chrome::ChromeDriver;
use super::driver::PageDriver;
use super::timeout::with_page_timeout;
use crate::config::CrawlConfig;
use crate::crawl_types::{CrawlError, CrawlResult};
use crate::page_extractor::js_scripts::{PAGE_PROBE_SCRIPT, READY_STATE_SCRIPT};
use crate::page_extractor::schema::PageProbe;
use crate::utils::constants::READINESS_POLL_INTERVAL_MS;

/// Everything the extractors read from a loaded page, as plain data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    /// Final URL after redirects, when the browser reports one
    pub url: Option<String>,
    pub html: String,
    pub probe: PageProbe,
}

impl PageSnapshot {
    /// Snapshot from HTML alone; image sizes come from `width`/`height` attributes
    #[must_use]
    pub fn from_html(url: Option<&str>, html: impl Into<String>) -> Self {
        Self {
            url: url.map(str::to_string),
            html: html.into(),
            probe: PageProbe::default(),
        }
    }
}

pub struct PageSession<D: PageDriver = ChromeDriver> {
    driver: D,
    config: CrawlConfig,
    span: Span,
}

impl PageSession<ChromeDriver> {
    /// Launch a browser for one crawl
    pub async fn launch(config: &CrawlConfig, span: Span) -> CrawlResult<Self> {
        let driver = ChromeDriver::launch(config)
            .instrument(span.clone())
            .await?;
        Ok(Self::new(driver, config.clone(), span))
    }

    /// Run `f` against a freshly launched session and always tear it down
    ///
    /// Teardown runs on success and on error. If the returned future is
    /// dropped mid-flight the driver's `Drop` kills the browser instead.
    pub async fn scoped<T, F>(config: &CrawlConfig, span: Span, f: F) -> CrawlResult<T>
    where
        F: AsyncFnOnce(&PageSession<ChromeDriver>) -> CrawlResult<T>,
    {
        let session = Self::launch(config, span).await?;
        session.run_scoped(f).await
    }
}

impl<D: PageDriver> PageSession<D> {
    pub fn new(driver: D, config: CrawlConfig, span: Span) -> Self {
        Self {
            driver,
            config,
            span,
        }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Run `f` with this session, then close it whatever `f` returned
    pub async fn run_scoped<T, F>(self, f: F) -> CrawlResult<T>
    where
        F: AsyncFnOnce(&PageSession<D>) -> CrawlResult<T>,
    {
        let result = f(&self).await;
        self.close().await;
        result
    }

    /// Navigate to `url`, retrying with exponential backoff
    ///
    /// An attempt fails on a driver error, a timeout, or a main-document
    /// status outside 200..=399. After `max_attempts` failures the last error
    /// is reported in `CrawlError::NavigationFailed`.
    pub async fn navigate(&self, url: &str) -> CrawlResult<()> {
        let retry = self.config.retry().clone();
        let mut last_error = String::from("no navigation attempted");

        for attempt in 0..retry.max_attempts {
            info!(
                parent: &self.span,
                "Attempting to navigate to {} (attempt {}/{})",
                url,
                attempt + 1,
                retry.max_attempts
            );

            match self.attempt_navigation(url).await {
                Ok(()) => {
                    debug!(parent: &self.span, "Navigation to {} succeeded", url);
                    return Ok(());
                }
                Err(e) => {
                    last_error = format!("{e:#}");
                    warn!(
                        parent: &self.span,
                        "Navigation attempt {} for {} failed: {}",
                        attempt + 1,
                        url,
                        last_error
                    );
                }
            }

            if attempt + 1 < retry.max_attempts {
                let delay = retry.delay_for_attempt(attempt);
                debug!(parent: &self.span, "Retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(CrawlError::NavigationFailed {
            url: url.to_string(),
            attempts: retry.max_attempts,
            last_error,
        })
    }

    async fn attempt_navigation(&self, url: &str) -> anyhow::Result<()> {
        let timeout = self.config.navigation_timeout();

        let response = with_page_timeout(self.driver.goto(url), timeout, "Page navigation").await?;
        if !response.is_success() {
            bail!(
                "HTTP status {} for {}",
                response.status.unwrap_or_default(),
                url
            );
        }

        with_page_timeout(self.wait_until_interactive(), timeout, "Document readiness").await
    }

    /// Poll `document.readyState` until the document is at least interactive
    async fn wait_until_interactive(&self) -> anyhow::Result<()> {
        let poll_interval = Duration::from_millis(READINESS_POLL_INTERVAL_MS);
        loop {
            match self.driver.evaluate(READY_STATE_SCRIPT).await {
                Ok(value) => {
                    let ready_state = value.get("readyState").and_then(|v| v.as_str());
                    let body_exists = value
                        .get("bodyExists")
                        .and_then(serde_json::Value::as_bool)
                        .unwrap_or(false);
                    if matches!(ready_state, Some("interactive" | "complete")) && body_exists {
                        return Ok(());
                    }
                }
                Err(e) => debug!(parent: &self.span, "Failed to check readyState: {e}, retrying"),
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Whether any readiness selector shows up within the readiness timeout
    ///
    /// Never errors: driver faults and timeouts both read as `false`.
    pub async fn content_ready(&self) -> bool {
        let timeout = self.config.readiness_timeout();
        let deadline = Instant::now() + timeout;
        let poll_interval = Duration::from_millis(READINESS_POLL_INTERVAL_MS);

        loop {
            for selector in self.config.readiness_selectors() {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                match tokio::time::timeout(remaining, self.driver.has_selector(selector)).await {
                    Ok(Ok(true)) => {
                        info!(parent: &self.span, "Content loaded successfully ('{}' present)", selector);
                        return true;
                    }
                    Ok(Ok(false)) => {}
                    Ok(Err(e)) => debug!(parent: &self.span, "Readiness probe '{}' failed: {e:#}", selector),
                    Err(_) => break,
                }
            }

            if Instant::now() + poll_interval >= deadline {
                warn!(
                    parent: &self.span,
                    "No readiness selector appeared within {:?}", timeout
                );
                return false;
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Capture HTML plus the live-layout probe
    ///
    /// A failed probe is logged and replaced by an empty one; extractors then
    /// fall back to HTML attributes.
    pub async fn snapshot(&self) -> CrawlResult<PageSnapshot> {
        let html = self.driver.html().await?;

        let url = match self.driver.current_url().await {
            Ok(url) => url,
            Err(e) => {
                debug!(parent: &self.span, "Could not read current URL: {e:#}");
                None
            }
        };

        let probe = match self.driver.evaluate(PAGE_PROBE_SCRIPT).await {
            Ok(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(parent: &self.span, "Page probe returned unexpected data: {e}");
                PageProbe::default()
            }),
            Err(e) => {
                warn!(parent: &self.span, "Page probe failed: {e:#}");
                PageProbe::default()
            }
        };

        Ok(PageSnapshot { url, html, probe })
    }

    /// Full-page PNG of the current page
    pub async fn screenshot(&self) -> CrawlResult<Vec<u8>> {
        Ok(self.driver.screenshot().await?)
    }

    /// Close the page and browser. Failures are logged, never returned.
    pub async fn close(mut self) {
        if let Err(e) = self.driver.close().await {
            warn!(parent: &self.span, "Failed to close page session: {e:#}");
        }
    }
}
