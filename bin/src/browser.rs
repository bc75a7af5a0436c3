//! Browser start-up from command-line options.

use anyhow::{Context, Result};
use bolsar_lib::{Browser, BrowserConfig, BrowserError, WebDriverBrowser};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Browser-related command-line options.
#[derive(Debug, Clone)]
pub(crate) struct BrowserOptions {
    pub(crate) browser_binary: Option<PathBuf>,
    pub(crate) driver: PathBuf,
    pub(crate) port: u16,
    pub(crate) webdriver_url: Option<String>,
}

impl BrowserOptions {
    fn config(&self, download_dir: Option<&Path>) -> BrowserConfig {
        let mut config = BrowserConfig {
            driver_binary: self.driver.clone(),
            driver_port: self.port,
            ..BrowserConfig::default()
        };
        if let Some(binary) = &self.browser_binary {
            config = config.with_browser_binary(binary);
        }
        if let Some(url) = &self.webdriver_url {
            config = config.with_webdriver_url(url);
        }
        if let Some(dir) = download_dir {
            config = config.with_download_dir(dir);
        }
        config
    }

    /// Starts a headless browser.
    ///
    /// A browser that cannot be started ends the run.
    pub(crate) async fn launch(&self, download_dir: Option<&Path>) -> Result<WebDriverBrowser> {
        WebDriverBrowser::launch(&self.config(download_dir))
            .await
            .map_err(|e| {
                let hint = match &e {
                    BrowserError::SessionNotCreated(_) => {
                        "Firefox could not be started, check the browser binary (-b)"
                    }
                    BrowserError::SpawnDriver { .. } | BrowserError::DriverTimeout(_) => {
                        "WebDriver could not be started, check --driver or use --webdriver-url"
                    }
                    _ => "Failed to start the browser",
                };
                anyhow::Error::new(e).context(hint)
            })
    }
}

/// Closes the browser, logging instead of failing.
pub(crate) async fn close(browser: WebDriverBrowser) {
    if let Err(e) = browser.close().await {
        warn!(error = %e, "failed to close the browser");
    }
}

/// Canonical form of the working directory, created when missing.
pub(crate) fn working_directory(directory: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create directory: {}", directory.display()))?;
    directory
        .canonicalize()
        .with_context(|| format!("Invalid directory: {}", directory.display()))
}
