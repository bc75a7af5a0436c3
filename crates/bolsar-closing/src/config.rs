//! Closing-data acquisition configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for acquiring closing data.
#[derive(Debug, Clone)]
pub struct ClosingConfig {
    /// Directory the browser downloads into. Must only hold the current
    /// batch of downloads.
    pub download_dir: PathBuf,
    /// Root under which one `YYYY-MM-DD` directory per date is created.
    pub destination_root: PathBuf,
    /// Also persist the negotiated-amounts table.
    pub negotiated_amounts: bool,
    /// Extension of the downloaded report files.
    pub report_extension: String,
    /// Upper bound on waiting for triggered downloads to land.
    pub download_timeout: Duration,
    /// Delay between download directory scans.
    pub download_poll_interval: Duration,
}

impl ClosingConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new(download_dir: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            destination_root: destination_root.into(),
            negotiated_amounts: false,
            report_extension: "csv".to_string(),
            download_timeout: Duration::from_secs(30),
            download_poll_interval: Duration::from_millis(250),
        }
    }

    /// Sets whether the negotiated-amounts table is persisted.
    #[must_use]
    pub const fn with_negotiated_amounts(mut self, enabled: bool) -> Self {
        self.negotiated_amounts = enabled;
        self
    }

    /// Sets the download wait bound.
    #[must_use]
    pub const fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closing_config_default() {
        let config = ClosingConfig::new("/tmp/dl", "/data");
        assert_eq!(config.report_extension, "csv");
        assert!(!config.negotiated_amounts);
        assert_eq!(config.download_timeout, Duration::from_secs(30));
        assert_eq!(config.destination_root, PathBuf::from("/data"));
    }
}
