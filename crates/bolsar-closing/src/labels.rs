//! Report label extraction.

use bolsar_browser::{Browser, Locator};
use bolsar_types::{Label, PANEL_MARKER};
use tracing::{debug, warn};

use crate::ClosingError;

/// Selector of the category label elements.
pub const LABEL_SELECTOR: &str = "span.mercados";

/// Class of the per-category download buttons.
pub const DOWNLOAD_BUTTON_CLASS: &str = "buttons-csv";

/// Reads the report labels from the open closing page and clicks every
/// download button.
///
/// Labels are normalized and only those after the panel marker are kept, so
/// a page whose last label is the marker yields an empty list and no button
/// is clicked.
///
/// # Errors
///
/// Returns [`ClosingError::ElementsNotFound`] when the page has no labels or
/// no panel marker.
pub async fn extract_labels<B: Browser + ?Sized>(browser: &B) -> Result<Vec<Label>, ClosingError> {
    let elements = browser
        .find_elements(None, &Locator::css(LABEL_SELECTOR))
        .await?;
    if elements.is_empty() {
        return Err(ClosingError::ElementsNotFound {
            what: "closing data".to_string(),
        });
    }

    let mut labels = Vec::with_capacity(elements.len());
    for element in &elements {
        labels.push(Label::normalize(&browser.text(element).await?));
    }

    let labels = Label::after_panel_marker(labels).ok_or_else(|| ClosingError::ElementsNotFound {
        what: format!("'{PANEL_MARKER}' heading"),
    })?;
    if labels.is_empty() {
        debug!("no report labels after the panel heading");
        return Ok(labels);
    }

    let buttons = browser
        .find_elements(None, &Locator::class(DOWNLOAD_BUTTON_CLASS))
        .await?;
    if buttons.len() != labels.len() {
        warn!(
            buttons = buttons.len(),
            labels = labels.len(),
            "download button count differs from label count"
        );
    }
    for button in &buttons {
        browser.click(button).await?;
    }

    debug!(labels = ?labels, "extracted report labels");
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bolsar_browser::fake::FakeBrowser;

    #[tokio::test]
    async fn test_extract_labels_after_marker() {
        let dir = tempfile::tempdir().unwrap();
        let browser = FakeBrowser::new()
            .with_labels(&["Resumen", "Paneles", "Acciones Lideres", "Bonos"])
            .with_download_buttons(dir.path(), &["a.csv", "b.csv"]);

        let labels = extract_labels(&browser).await.unwrap();

        assert_eq!(
            labels,
            vec![Label::normalize("acciones_lideres"), Label::normalize("bonos")]
        );
        assert_eq!(browser.click_count(), 2);
    }

    #[tokio::test]
    async fn test_no_labels_is_not_found() {
        let browser = FakeBrowser::new();
        let err = extract_labels(&browser).await.unwrap_err();
        assert!(matches!(err, ClosingError::ElementsNotFound { .. }));
        assert_eq!(browser.click_count(), 0);
    }

    #[tokio::test]
    async fn test_marker_last_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let browser = FakeBrowser::new()
            .with_labels(&["Resumen", "Paneles"])
            .with_download_buttons(dir.path(), &["a.csv"]);
        let labels = extract_labels(&browser).await.unwrap();
        assert!(labels.is_empty());
        assert_eq!(browser.click_count(), 0);
        assert!(!dir.path().join("a.csv").exists());
    }

    #[tokio::test]
    async fn test_missing_marker_is_not_found() {
        let browser = FakeBrowser::new().with_labels(&["Acciones", "Bonos"]);
        let err = extract_labels(&browser).await.unwrap_err();
        assert!(matches!(err, ClosingError::ElementsNotFound { .. }));
    }
}
