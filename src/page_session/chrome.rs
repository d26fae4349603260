//! chromiumoxide implementation of `PageDriver`
//!
//! One `ChromeDriver` owns one browser process, its CDP handler task and one
//! page. Dropping the driver without `close()` still aborts the handler, kills
//! the browser and removes the temporary profile directory.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::network::{EventResponseReceived, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::driver::{DriverFactory, NavigationResponse, PageDriver};
use crate::browser_setup::launch_browser;
use crate::config::CrawlConfig;

/// How long to wait for the main document's response event after `goto`
const DOCUMENT_STATUS_WAIT: Duration = Duration::from_millis(500);

/// Launches a dedicated Chrome process for every crawl
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeLauncher;

#[async_trait]
impl DriverFactory for ChromeLauncher {
    type Driver = ChromeDriver;

    async fn open(&self, config: &CrawlConfig) -> Result<ChromeDriver> {
        ChromeDriver::launch(config).await
    }
}

pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    /// Temporary profile to remove on teardown. `None` for a configured profile.
    user_data_dir: Option<PathBuf>,
    closed: bool,
}

impl ChromeDriver {
    /// Launch a browser and open one page sized and identified per `config`
    pub async fn launch(config: &CrawlConfig) -> Result<Self> {
        let (browser, handler, profile_dir) = launch_browser(config).await?;
        let user_data_dir = config.chrome_data_dir().is_none().then_some(profile_dir);

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let mut browser = browser;
                if let Err(close_err) = browser.close().await {
                    log::warn!("Failed to close browser after page error: {close_err}");
                }
                let _ = browser.wait().await;
                handler.abort();
                if let Some(dir) = user_data_dir {
                    let _ = std::fs::remove_dir_all(dir);
                }
                return Err(anyhow::anyhow!("Failed to create page: {e}"));
            }
        };

        let mut driver = Self {
            browser,
            page,
            handler,
            user_data_dir,
            closed: false,
        };

        if let Err(e) = driver.configure_page(config).await {
            if let Err(close_err) = driver.close().await {
                log::warn!("Failed to close browser after setup error: {close_err}");
            }
            return Err(e);
        }

        Ok(driver)
    }

    async fn configure_page(&self, config: &CrawlConfig) -> Result<()> {
        let (width, height) = config.viewport();
        self.page
            .execute(
                SetDeviceMetricsOverrideParams::builder()
                    .width(i64::from(width))
                    .height(i64::from(height))
                    .device_scale_factor(1.0)
                    .mobile(false)
                    .build()
                    .map_err(anyhow::Error::msg)?,
            )
            .await
            .context("Failed to set viewport")?;

        self.page
            .execute(SetUserAgentOverrideParams::new(config.user_agent()))
            .await
            .context("Failed to set user agent")?;

        Ok(())
    }

    /// Remove the temporary profile directory
    ///
    /// Must run after `browser.wait()` so Chrome has released its file handles.
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            log::debug!("Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                log::warn!(
                    "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn goto(&self, url: &str) -> Result<NavigationResponse> {
        let mut responses = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .context("Failed to subscribe to network responses")?;

        self.page
            .goto(url)
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        // The first document response after goto is the main frame's
        let status = tokio::time::timeout(DOCUMENT_STATUS_WAIT, async {
            while let Some(event) = responses.next().await {
                if event.r#type == ResourceType::Document {
                    return Some(event.response.status);
                }
            }
            None
        })
        .await
        .ok()
        .flatten();

        Ok(NavigationResponse { status })
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        self.page
            .evaluate(script)
            .await
            .context("Failed to evaluate script")?
            .into_value::<serde_json::Value>()
            .map_err(|e| anyhow::anyhow!("Script returned a non-JSON value: {e}"))
    }

    async fn has_selector(&self, selector: &str) -> Result<bool> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| anyhow::anyhow!("Selector query '{selector}' failed: {e}"))?;
        Ok(!elements.is_empty())
    }

    async fn html(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get page content: {e}"))
    }

    async fn current_url(&self) -> Result<Option<String>> {
        self.page
            .url()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read page URL: {e}"))
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let params = CaptureScreenshotParams {
            format: Some(CaptureScreenshotFormat::Png),
            capture_beyond_viewport: Some(true),
            ..Default::default()
        };

        self.page
            .screenshot(params)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to capture screenshot: {e}"))
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Err(e) = self.page.clone().close().await {
            log::debug!("Failed to close page cleanly: {e}");
        }
        if let Err(e) = self.browser.close().await {
            log::warn!("Failed to close browser cleanly: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            log::warn!("Failed to wait for browser exit: {e}");
        }

        self.handler.abort();
        self.cleanup_temp_dir();
        log::debug!("Browser session closed");
        Ok(())
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        log::warn!("ChromeDriver dropped without close() - aborting handler task");
        self.handler.abort();
        // Browser's own Drop kills the Chrome process
        self.cleanup_temp_dir();
    }
}
