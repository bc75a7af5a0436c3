//! Closing-data error types.

use bolsar_browser::BrowserError;
use bolsar_types::{DateKey, FailureKind};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while acquiring closing data.
#[derive(Error, Debug)]
pub enum ClosingError {
    /// Expected page structure was absent.
    #[error("Unable to locate the {what}, probably the page layout changed or the URL is wrong")]
    ElementsNotFound {
        /// What was being looked for.
        what: String,
    },

    /// The date's page carried no closing data.
    #[error(
        "No closing data for {date} ({what} missing): check the date, the URL is probably wrong or the market was closed that day"
    )]
    WrongDate {
        /// The requested date.
        date: DateKey,
        /// What was missing from the page.
        what: String,
    },

    /// The destination for the date already exists.
    #[error("There is already a directory for {date} ({}), check its content", path.display())]
    AlreadyAcquired {
        /// The requested date.
        date: DateKey,
        /// The existing destination directory.
        path: PathBuf,
    },

    /// Labels and downloaded report files do not pair up.
    #[error("Cannot reconcile {labels} labels with {files} downloaded report files")]
    Reconciliation {
        /// Number of labels.
        labels: usize,
        /// Number of report files found.
        files: usize,
    },

    /// The download directory does not exist.
    #[error("Download directory '{}' does not exist", path.display())]
    SourceMissing {
        /// The missing directory.
        path: PathBuf,
    },

    /// The browser failed.
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// A report file could not be moved into place.
    #[error("Failed to move '{}' to '{}': {source}", from.display(), to.display())]
    MoveFile {
        /// Source path.
        from: PathBuf,
        /// Destination path.
        to: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Filesystem access failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),
}

impl ClosingError {
    /// Re-labels a missing-element failure as a wrong-date failure for `date`.
    ///
    /// On a date-specific page a missing structure is indistinguishable from
    /// a date without trading.
    #[must_use]
    pub fn on_date(self, date: DateKey) -> Self {
        match self {
            Self::ElementsNotFound { what } => Self::WrongDate { date, what },
            other => other,
        }
    }

    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::ElementsNotFound { .. } => FailureKind::ElementsNotFound,
            Self::WrongDate { .. } => FailureKind::WrongDate,
            Self::AlreadyAcquired { .. } => FailureKind::AlreadyAcquired,
            Self::Reconciliation { .. } | Self::SourceMissing { .. } => {
                FailureKind::Reconciliation
            }
            Self::Browser(_) => FailureKind::Browser,
            Self::MoveFile { .. } | Self::Io { .. } | Self::Csv(_) => FailureKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    /// Maps a browser lookup failure to [`ClosingError::ElementsNotFound`]
    /// when the element is absent.
    pub(crate) fn missing(what: &'static str) -> impl FnOnce(BrowserError) -> Self {
        move |e| {
            if e.is_no_such_element() {
                Self::ElementsNotFound {
                    what: what.to_string(),
                }
            } else {
                Self::Browser(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_date() {
        let date = DateKey::parse("2023-07-15").unwrap();
        let err = ClosingError::ElementsNotFound {
            what: "closing data labels".to_string(),
        }
        .on_date(date);
        assert!(matches!(err, ClosingError::WrongDate { .. }));
        assert_eq!(err.kind(), FailureKind::WrongDate);
        assert!(err.to_string().contains("2023-07-15"));
    }

    #[test]
    fn test_on_date_keeps_other_errors() {
        let date = DateKey::parse("2023-07-15").unwrap();
        let err = ClosingError::Reconciliation { labels: 3, files: 2 }.on_date(date);
        assert_eq!(err.kind(), FailureKind::Reconciliation);
    }

    #[test]
    fn test_missing_maps_no_such_element() {
        let err = ClosingError::missing("negotiated amounts table")(BrowserError::NoSuchElement(
            "id 'tabla'".to_string(),
        ));
        assert!(matches!(err, ClosingError::ElementsNotFound { .. }));

        let err = ClosingError::missing("negotiated amounts table")(BrowserError::Protocol(
            "bad".to_string(),
        ));
        assert_eq!(err.kind(), FailureKind::Browser);
    }
}
