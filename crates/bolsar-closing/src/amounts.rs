//! Negotiated-amounts table extraction and CSV output.

use bolsar_browser::{Browser, Locator};
use bolsar_types::{NEGOTIATED_AMOUNTS_FILE, NegotiatedAmounts};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::ClosingError;

/// Element id of the negotiated-amounts table.
pub const AMOUNTS_TABLE_ID: &str = "tabla";

/// Reads the negotiated-amounts table from the open closing page.
///
/// Every `tbody > tr` becomes one row holding the text of its `td` cells.
///
/// # Errors
///
/// Returns [`ClosingError::ElementsNotFound`] when the table, its body or
/// its rows are absent.
pub async fn extract_negotiated_amounts<B: Browser + ?Sized>(
    browser: &B,
) -> Result<NegotiatedAmounts, ClosingError> {
    let table = browser
        .find_element(None, &Locator::id(AMOUNTS_TABLE_ID))
        .await
        .map_err(ClosingError::missing("negotiated amounts table"))?;
    let body = browser
        .find_element(Some(&table), &Locator::tag("tbody"))
        .await
        .map_err(ClosingError::missing("negotiated amounts table body"))?;
    let rows = browser
        .find_elements(Some(&body), &Locator::tag("tr"))
        .await?;
    if rows.is_empty() {
        return Err(ClosingError::ElementsNotFound {
            what: "negotiated amounts rows".to_string(),
        });
    }

    let mut matrix = Vec::with_capacity(rows.len());
    for row in &rows {
        let cells = browser
            .find_elements(Some(row), &Locator::tag("td"))
            .await?;
        let mut values = Vec::with_capacity(cells.len());
        for cell in &cells {
            values.push(browser.text(cell).await?);
        }
        matrix.push(values);
    }

    debug!(rows = matrix.len(), "read negotiated amounts");
    Ok(NegotiatedAmounts::new(matrix))
}

/// Writes the header and first data row of `amounts` to
/// `<dir>/montos_negociados.csv`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub async fn write_negotiated_amounts(
    dir: &Path,
    amounts: &NegotiatedAmounts,
) -> Result<PathBuf, ClosingError> {
    let path = dir.join(NEGOTIATED_AMOUNTS_FILE);
    let file = tokio::fs::File::create(&path)
        .await
        .map_err(ClosingError::io(&path))?;

    let mut writer = csv_async::AsyncWriterBuilder::new()
        .flexible(true)
        .create_writer(file);
    for row in amounts.headline() {
        writer.write_record(row).await?;
    }
    writer.flush().await.map_err(ClosingError::io(&path))?;

    debug!(path = %path.display(), "wrote negotiated amounts");
    Ok(path)
}
