//! Chrome/Chromium discovery and launch.
//!
//! Finds a local browser (or downloads a managed one) and launches it with the
//! viewport, user agent and profile directory of a `CrawlConfig`.

use anyhow::{Context, Result, anyhow};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

use crate::config::CrawlConfig;

/// Environment variables naming a browser binary, checked in order
const BROWSER_PATH_VARS: &[&str] = &["STOREFRONT_CHROME_PATH", "CHROMIUM_PATH"];

/// Binary names looked up on `PATH`
const BROWSER_BINARIES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

#[cfg(target_os = "windows")]
const INSTALL_PATHS: &[&str] = &[
    r"%PROGRAMFILES%\Google\Chrome\Application\chrome.exe",
    r"%PROGRAMFILES(X86)%\Google\Chrome\Application\chrome.exe",
    r"%LOCALAPPDATA%\Google\Chrome\Application\chrome.exe",
    r"%PROGRAMFILES%\Chromium\Application\chrome.exe",
];

#[cfg(target_os = "macos")]
const INSTALL_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "~/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/homebrew/bin/chromium",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const INSTALL_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/opt/google/chrome/chrome",
];

/// Flags for an unattended product crawl
const CHROME_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-notifications",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-setuid-sandbox",
    "--no-first-run",
    "--no-default-browser-check",
    "--no-sandbox",
    "--disable-extensions",
    "--disable-popup-blocking",
    "--hide-scrollbars",
    "--mute-audio",
];

static WINDOWS_ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%([^%]+)%").expect("BUG: hardcoded env var regex is invalid")
});

/// Replace `%VAR%` tokens with their values. Unknown variables stay as written.
fn expand_windows_env_vars(path: &str) -> String {
    WINDOWS_ENV_VAR
        .replace_all(path, |caps: &regex::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

fn expand_install_path(raw: &str) -> Option<PathBuf> {
    if let Some(rest) = raw.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    Some(PathBuf::from(expand_windows_env_vars(raw)))
}

fn find_on_path(binary: &str) -> Option<PathBuf> {
    let search_path = std::env::var_os("PATH")?;
    std::env::split_paths(&search_path)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// Find a local Chrome/Chromium
///
/// Order: `STOREFRONT_CHROME_PATH` / `CHROMIUM_PATH`, the platform's install
/// locations, then `PATH`.
///
/// # Errors
///
/// When no executable exists in any of those places.
pub async fn find_browser_executable() -> Result<PathBuf> {
    for var in BROWSER_PATH_VARS {
        let Ok(value) = std::env::var(var) else {
            continue;
        };
        let path = PathBuf::from(value);
        if path.exists() {
            info!("Using browser from {}: {}", var, path.display());
            return Ok(path);
        }
        warn!("{} points to a missing file: {}", var, path.display());
    }

    if let Some(path) = INSTALL_PATHS
        .iter()
        .filter_map(|raw| expand_install_path(raw))
        .find(|path| path.exists())
    {
        info!("Found browser at: {}", path.display());
        return Ok(path);
    }

    if let Some(path) = BROWSER_BINARIES.iter().find_map(|binary| find_on_path(binary)) {
        info!("Found browser on PATH: {}", path.display());
        return Ok(path);
    }

    Err(anyhow!("Chrome/Chromium executable not found"))
}

/// Download a Chromium build into the user cache and return its executable
///
/// # Errors
///
/// Cache directory creation or the download itself failed.
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                "Could not determine user cache directory, using {}",
                fallback.display()
            );
            fallback
        })
        .join("storefront_crawl")
        .join("chromium");
    info!("Downloading managed Chromium into {}", cache_dir.display());

    tokio::fs::create_dir_all(&cache_dir)
        .await
        .context("Failed to create browser cache directory")?;

    let options = BrowserFetcherOptions::builder()
        .with_path(&cache_dir)
        .build()
        .context("Failed to build fetcher options")?;
    let revision = BrowserFetcher::new(options)
        .fetch()
        .await
        .context("Failed to fetch browser")?;

    info!("Downloaded Chromium to {}", revision.folder_path.display());
    Ok(revision.executable_path)
}

/// Per-session Chrome profile directory
///
/// Uses the configured directory when present, otherwise a unique temp dir so
/// concurrent sessions never contend for the same profile lock.
#[must_use]
pub fn session_profile_dir(config: &CrawlConfig) -> PathBuf {
    config.chrome_data_dir().map_or_else(
        || {
            std::env::temp_dir().join(format!(
                "storefront_chrome_{}_{}",
                std::process::id(),
                uuid::Uuid::new_v4().simple()
            ))
        },
        Path::to_path_buf,
    )
}

/// Chrome emits CDP events chromiumoxide cannot deserialize; these are noise
fn is_benign_cdp_error(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

/// Launch Chrome/Chromium configured for one crawl session.
///
/// Returns the browser, the CDP handler task and the profile directory that
/// must be removed once the browser has exited.
///
/// # Errors
///
/// No browser could be found or downloaded, or Chrome failed to start.
pub async fn launch_browser(config: &CrawlConfig) -> Result<(Browser, JoinHandle<()>, PathBuf)> {
    let chrome_path = match find_browser_executable().await {
        Ok(path) => path,
        Err(e) => {
            warn!("{e}; falling back to a managed download");
            download_managed_browser().await?
        }
    };

    let user_data_dir = session_profile_dir(config);
    tokio::fs::create_dir_all(&user_data_dir)
        .await
        .context("Failed to create user data directory")?;

    let (width, height) = config.viewport();
    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(config.navigation_timeout())
        .window_size(width, height)
        .viewport(None)
        .user_data_dir(user_data_dir.clone())
        .chrome_executable(chrome_path)
        .arg(format!("--user-agent={}", config.user_agent()));

    builder = if config.headless() {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };
    for arg in CHROME_ARGS {
        builder = builder.arg(*arg);
    }

    let browser_config = builder
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {e}"))?;

    debug!("Launching browser with config: {:?}", browser_config);
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                if is_benign_cdp_error(&message) {
                    trace!("Suppressed benign CDP serialization error: {}", message);
                } else {
                    error!("Browser handler error: {:?}", e);
                }
            }
        }
        debug!("Browser handler task completed");
    });

    Ok((browser, handler_task, user_data_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_windows_vars_are_preserved() {
        assert_eq!(
            expand_windows_env_vars("%STOREFRONT_UNSET_VAR%\\chrome.exe"),
            "%STOREFRONT_UNSET_VAR%\\chrome.exe"
        );
        assert_eq!(expand_windows_env_vars("%unterminated"), "%unterminated");
    }

    #[test]
    fn cdp_noise_is_recognized() {
        assert!(is_benign_cdp_error(
            "data did not match any variant of untagged enum Message at line 1"
        ));
        assert!(!is_benign_cdp_error("connection closed"));
    }

    #[test]
    fn profile_dirs_are_unique_per_session() {
        let config = CrawlConfig::default();
        assert_ne!(session_profile_dir(&config), session_profile_dir(&config));

        let pinned = CrawlConfig::builder()
            .chrome_data_dir(Some(PathBuf::from("/tmp/pinned-profile")))
            .build()
            .unwrap();
        assert_eq!(session_profile_dir(&pinned), PathBuf::from("/tmp/pinned-profile"));
    }
}
