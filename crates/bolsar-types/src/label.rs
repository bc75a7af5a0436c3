//! Report category labels.

use derive_more::{Display, Into};
use serde::{Deserialize, Serialize};

/// Label that precedes the per-category report labels on the closing page.
///
/// Everything up to and including this label is page heading, not a report.
pub const PANEL_MARKER: &str = "paneles";

/// A normalized report category name.
///
/// Labels are lower-cased with spaces replaced by underscores, and become the
/// base name of the reconciled report file (`<label>.csv`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Into, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Normalizes raw on-page text into a label.
    ///
    /// Surrounding whitespace is trimmed before lower-casing, then each inner
    /// space becomes an underscore. Rendered element text is usually trimmed
    /// already, so this only matters for raw strings.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_lowercase().replace(' ', "_"))
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the file name for this label with the given extension.
    #[must_use]
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.0)
    }

    /// Returns true if this label is the panel marker.
    #[must_use]
    pub fn is_panel_marker(&self) -> bool {
        self.0 == PANEL_MARKER
    }

    /// Keeps only the labels that follow the panel marker.
    ///
    /// Returns `None` when the marker is absent.
    #[must_use]
    pub fn after_panel_marker(labels: Vec<Self>) -> Option<Vec<Self>> {
        let marker = labels.iter().position(Self::is_panel_marker)?;
        Some(labels.into_iter().skip(marker + 1).collect())
    }
}

impl From<&str> for Label {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}
