//! Browser configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for launching a WebDriver-controlled browser.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Firefox binary location. Uses the driver's default lookup when unset.
    pub browser_binary: Option<PathBuf>,
    /// Directory where downloads are saved without prompting.
    pub download_dir: Option<PathBuf>,
    /// Run without a visible window.
    pub headless: bool,
    /// How long element lookups wait for matches to appear.
    pub implicit_wait: Duration,
    /// WebDriver executable spawned when no external endpoint is given.
    pub driver_binary: PathBuf,
    /// Port the spawned WebDriver listens on.
    pub driver_port: u16,
    /// Externally managed WebDriver endpoint (e.g. `http://127.0.0.1:4444`).
    pub webdriver_url: Option<String>,
    /// How long to wait for a spawned WebDriver to become ready.
    pub driver_startup_timeout: Duration,
    /// Timeout for a single WebDriver command.
    pub command_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            browser_binary: None,
            download_dir: None,
            headless: true,
            implicit_wait: Duration::from_secs(10),
            driver_binary: PathBuf::from("geckodriver"),
            driver_port: 4444,
            webdriver_url: None,
            driver_startup_timeout: Duration::from_secs(15),
            command_timeout: Duration::from_secs(120),
        }
    }
}

impl BrowserConfig {
    /// Sets the download directory.
    #[must_use]
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Sets the browser binary location.
    #[must_use]
    pub fn with_browser_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.browser_binary = Some(binary.into());
        self
    }

    /// Uses an already running WebDriver endpoint instead of spawning one.
    #[must_use]
    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config_default() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.implicit_wait, Duration::from_secs(10));
        assert_eq!(config.driver_port, 4444);
        assert!(config.download_dir.is_none());
        assert!(config.webdriver_url.is_none());
    }

    #[test]
    fn test_builders() {
        let config = BrowserConfig::default()
            .with_download_dir("/tmp/downloads")
            .with_browser_binary("/opt/firefox/firefox");
        assert_eq!(config.download_dir, Some(PathBuf::from("/tmp/downloads")));
        assert_eq!(
            config.browser_binary,
            Some(PathBuf::from("/opt/firefox/firefox"))
        );
    }
}
