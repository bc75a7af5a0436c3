//! Per-date closing-data acquisition.

use bolsar_browser::Browser;
use bolsar_types::{AcquisitionState, DateKey, DestinationStatus, PortalConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::amounts::{extract_negotiated_amounts, write_negotiated_amounts};
use crate::downloads::{discard_downloads, wait_for_downloads};
use crate::labels::extract_labels;
use crate::reconcile::{ReconciledFile, reconcile};
use crate::{ClosingConfig, ClosingError};

/// Files written for one completed date.
#[derive(Debug, Clone)]
pub struct ClosingReport {
    /// The acquired date.
    pub date: DateKey,
    /// The date's destination directory.
    pub directory: PathBuf,
    /// Report files, in label order.
    pub files: Vec<ReconciledFile>,
    /// Negotiated-amounts CSV, when requested.
    pub negotiated_amounts: Option<PathBuf>,
}

/// Final outcome of one date.
#[derive(Debug)]
pub enum DateOutcome {
    /// All files for the date were written.
    Completed(ClosingReport),
    /// The destination already existed; nothing was touched.
    Skipped {
        /// The requested date.
        date: DateKey,
        /// The existing destination directory.
        path: PathBuf,
    },
    /// The acquisition failed.
    Failed {
        /// The requested date.
        date: DateKey,
        /// What went wrong.
        error: ClosingError,
    },
}

impl DateOutcome {
    /// Returns the date this outcome belongs to.
    #[must_use]
    pub const fn date(&self) -> DateKey {
        match self {
            Self::Completed(report) => report.date,
            Self::Skipped { date, .. } | Self::Failed { date, .. } => *date,
        }
    }

    /// Returns the terminal state.
    #[must_use]
    pub const fn state(&self) -> AcquisitionState {
        match self {
            Self::Completed(_) => AcquisitionState::Completed,
            Self::Skipped { .. } => AcquisitionState::Skipped,
            Self::Failed { .. } => AcquisitionState::Failed,
        }
    }

    fn from_result(date: DateKey, result: Result<ClosingReport, ClosingError>) -> Self {
        match result {
            Ok(report) => Self::Completed(report),
            Err(ClosingError::AlreadyAcquired { date, path }) => Self::Skipped { date, path },
            Err(error) => Self::Failed { date, error },
        }
    }
}

/// State tracker for one date.
struct DateRun {
    date: DateKey,
    state: AcquisitionState,
}

impl DateRun {
    const fn new(date: DateKey) -> Self {
        Self {
            date,
            state: AcquisitionState::NotStarted,
        }
    }

    fn advance(&mut self, next: AcquisitionState) {
        debug_assert!(!self.state.is_finished(), "date {} already finished", self.date);
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        debug!(date = %self.date, from = %self.state, to = %next, "closing state");
        self.state = next;
    }
}

/// Acquires closing data one date at a time through a browser.
///
/// The browser is borrowed for the acquirer's lifetime and must not be
/// driven by anything else meanwhile. The download directory must only
/// receive this acquirer's downloads: report files left there are discarded
/// before each date and after a failed one.
#[derive(Debug)]
pub struct ClosingAcquirer<'a, B: Browser + ?Sized> {
    browser: &'a B,
    portal: PortalConfig,
    config: ClosingConfig,
}

impl<'a, B: Browser + ?Sized> ClosingAcquirer<'a, B> {
    /// Creates an acquirer.
    #[must_use]
    pub const fn new(browser: &'a B, portal: PortalConfig, config: ClosingConfig) -> Self {
        Self {
            browser,
            portal,
            config,
        }
    }

    /// Acquires the closing data for `date`.
    ///
    /// Nothing is navigated or written when the date's destination already
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`ClosingError::AlreadyAcquired`] when the destination exists,
    /// [`ClosingError::WrongDate`] when the page carries no closing data, and
    /// other variants for browser, reconciliation or I/O failures.
    pub async fn acquire(&self, date: DateKey) -> Result<ClosingReport, ClosingError> {
        let mut run = DateRun::new(date);
        let status = DestinationStatus::check(&self.config.destination_root, date);
        run.advance(AcquisitionState::Checked);
        debug!(%date, path = %status.path().display(), "destination checked");

        let directory = match status {
            DestinationStatus::AlreadyPresent(path) => {
                run.advance(AcquisitionState::Skipped);
                warn!(%date, path = %path.display(), "closing data already present");
                return Err(ClosingError::AlreadyAcquired { date, path });
            }
            DestinationStatus::Proceed(directory) => directory,
        };

        run.advance(AcquisitionState::InProgress);
        match self.collect(date, &directory).await {
            Ok(report) => {
                run.advance(AcquisitionState::Completed);
                info!(%date, files = report.files.len(), "closing data acquired");
                Ok(report)
            }
            Err(e) => {
                run.advance(AcquisitionState::Failed);
                if let Err(cleanup) =
                    discard_downloads(&self.config.download_dir, &self.config.report_extension)
                {
                    warn!(%date, error = %cleanup, "failed to discard downloads");
                }
                Err(e)
            }
        }
    }

    /// Acquires `date` and folds the result into an outcome.
    pub async fn run(&self, date: DateKey) -> DateOutcome {
        DateOutcome::from_result(date, self.acquire(date).await)
    }

    /// Acquires every date in order. A failed date does not stop the others
    /// and is never retried.
    pub async fn run_dates(&self, dates: &[DateKey]) -> Vec<DateOutcome> {
        let mut outcomes = Vec::with_capacity(dates.len());
        for &date in dates {
            let outcome = self.run(date).await;
            if let DateOutcome::Failed { error, .. } = &outcome {
                warn!(%date, kind = %error.kind(), "closing acquisition failed: {error}");
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn collect(&self, date: DateKey, directory: &Path) -> Result<ClosingReport, ClosingError> {
        let config = &self.config;
        let stale = discard_downloads(&config.download_dir, &config.report_extension)?;
        if stale > 0 {
            warn!(%date, files = stale, "discarded leftover downloads");
        }

        let url = self.portal.closing_url(date);
        info!(%date, %url, "opening closing page");
        self.browser.navigate(&url).await?;

        let labels = extract_labels(self.browser)
            .await
            .map_err(|e| e.on_date(date))?;
        if labels.is_empty() {
            return Err(ClosingError::WrongDate {
                date,
                what: "report labels".to_string(),
            });
        }

        let amounts = if config.negotiated_amounts {
            Some(
                extract_negotiated_amounts(self.browser)
                    .await
                    .map_err(|e| e.on_date(date))?,
            )
        } else {
            None
        };

        wait_for_downloads(
            &config.download_dir,
            labels.len(),
            &config.report_extension,
            config.download_timeout,
            config.download_poll_interval,
        )
        .await?;
        let files = reconcile(
            &config.download_dir,
            directory,
            &labels,
            &config.report_extension,
        )?;

        let negotiated_amounts = match &amounts {
            Some(amounts) => Some(write_negotiated_amounts(directory, amounts).await?),
            None => None,
        };

        if let Err(e) = self.browser.navigate(&self.portal.reset_url).await {
            warn!(%date, error = %e, "failed to reset browser page");
        }

        Ok(ClosingReport {
            date,
            directory: directory.to_path_buf(),
            files,
            negotiated_amounts,
        })
    }
}
