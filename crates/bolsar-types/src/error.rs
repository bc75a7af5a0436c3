//! Error types shared across the bolsar crates.

use thiserror::Error;

/// Error for malformed acquisition dates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateKeyError {
    /// The input is not a `YYYY-MM-DD` calendar date.
    #[error("Invalid date '{input}', expected YYYY-MM-DD")]
    Malformed {
        /// The rejected input.
        input: String,
    },
}

/// Classification of a failed acquisition, used when reporting per-date or
/// per-run outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Expected page structure was absent.
    ElementsNotFound,
    /// The date-specific page had no data (non-trading day or stale URL).
    WrongDate,
    /// The destination for the date was already populated.
    AlreadyAcquired,
    /// Downloaded files could not be paired with the labels.
    Reconciliation,
    /// Connection-level HTTP failure.
    Transport,
    /// The certificate trust chain could not be built.
    TrustChain,
    /// The browser automation layer failed.
    Browser,
    /// Filesystem or serialization failure.
    Io,
    /// Any other failure.
    Other,
}

impl FailureKind {
    /// Returns the kind as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ElementsNotFound => "elements-not-found",
            Self::WrongDate => "wrong-date",
            Self::AlreadyAcquired => "already-acquired",
            Self::Reconciliation => "reconciliation",
            Self::Transport => "transport",
            Self::TrustChain => "trust-chain",
            Self::Browser => "browser",
            Self::Io => "io",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
