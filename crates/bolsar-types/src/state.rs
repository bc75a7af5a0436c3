//! Per-date acquisition state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::DateKey;

/// State of a closing-data acquisition for one date.
///
/// `NotStarted -> Checked -> (Skipped | InProgress -> (Completed | Failed))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AcquisitionState {
    /// Nothing has been done for the date yet.
    #[default]
    NotStarted,
    /// The destination directory has been checked.
    Checked,
    /// The destination already existed; nothing was written.
    Skipped,
    /// Page navigation and file reconciliation are running.
    InProgress,
    /// All files for the date were written.
    Completed,
    /// The acquisition failed.
    Failed,
}

impl AcquisitionState {
    /// Returns true if the state is terminal.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Skipped | Self::Completed | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Checked)
                | (Self::Checked, Self::Skipped | Self::InProgress | Self::Failed)
                | (Self::InProgress, Self::Completed | Self::Failed)
        )
    }

    /// Returns the state as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::Checked => "checked",
            Self::Skipped => "skipped",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of the idempotency check for a date's destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationStatus {
    /// The directory exists; the date was acquired before.
    AlreadyPresent(PathBuf),
    /// The directory is absent; acquisition may write to it.
    Proceed(PathBuf),
}

impl DestinationStatus {
    /// Checks whether the destination for `date` exists under `root`.
    ///
    /// The answer is only valid at call time; concurrent writers are not
    /// guarded against.
    #[must_use]
    pub fn check(root: &Path, date: DateKey) -> Self {
        let directory = date.directory_in(root);
        if directory.exists() {
            Self::AlreadyPresent(directory)
        } else {
            Self::Proceed(directory)
        }
    }

    /// Returns the destination directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::AlreadyPresent(path) | Self::Proceed(path) => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        use AcquisitionState::*;
        assert!(NotStarted.can_transition_to(Checked));
        assert!(Checked.can_transition_to(Skipped));
        assert!(Checked.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Failed));
    }

    #[test]
    fn test_illegal_transitions() {
        use AcquisitionState::*;
        assert!(!NotStarted.can_transition_to(InProgress));
        assert!(!Skipped.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!InProgress.can_transition_to(Skipped));
    }

    #[test]
    fn test_terminal_states() {
        assert!(AcquisitionState::Skipped.is_finished());
        assert!(AcquisitionState::Completed.is_finished());
        assert!(AcquisitionState::Failed.is_finished());
        assert!(!AcquisitionState::InProgress.is_finished());
    }

    #[test]
    fn test_destination_check() {
        let root = tempfile::tempdir().unwrap();
        let date = DateKey::parse("2023-07-14").unwrap();

        let status = DestinationStatus::check(root.path(), date);
        assert_eq!(
            status,
            DestinationStatus::Proceed(root.path().join("2023-07-14"))
        );
        assert_eq!(status.path(), root.path().join("2023-07-14"));

        std::fs::create_dir(root.path().join("2023-07-14")).unwrap();
        let status = DestinationStatus::check(root.path(), date);
        assert!(matches!(status, DestinationStatus::AlreadyPresent(_)));
    }
}
