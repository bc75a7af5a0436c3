//! Issuer summary from the portal's instrument information page.

use bolsar_browser::{Browser, Locator};
use bolsar_types::{IssuerSummary, PortalConfig};
use tracing::debug;

use crate::MetadataError;

/// Element id of the instrument heading table.
pub const TITLE_TABLE_ID: &str = "titulo-table";

const ISSUER_MARKER: &str = "EMISOR";
const NOMINAL_VALUE_MARKER: &str = "VALOR NOMINAL";

/// Extracts the issuer and nominal value from the heading table text.
///
/// The issuer is every word after the first on the `EMISOR` line; the
/// nominal value is the third word of the `VALOR NOMINAL` line, written with
/// a decimal comma. Missing or unreadable lines leave the defaults.
#[must_use]
pub fn parse_issuer_summary(symbol: &str, text: &str) -> IssuerSummary {
    let mut summary = IssuerSummary {
        symbol: symbol.to_string(),
        ..IssuerSummary::default()
    };

    for line in text.lines() {
        if line.contains(ISSUER_MARKER) {
            summary.issuer = line.split(' ').skip(1).collect::<Vec<_>>().join(" ");
        } else if line.contains(NOMINAL_VALUE_MARKER)
            && let Some(value) = line.split(' ').nth(2)
            && let Ok(value) = value.replace(',', ".").parse::<f64>()
        {
            summary.nominal_value = value;
        }
    }
    summary
}

/// Opens the information page of `symbol` and reads its issuer summary.
///
/// # Errors
///
/// Returns [`MetadataError::ElementsNotFound`] if the page has no heading
/// table, or a browser error.
pub async fn fetch_issuer_summary<B: Browser + ?Sized>(
    browser: &B,
    portal: &PortalConfig,
    symbol: &str,
) -> Result<IssuerSummary, MetadataError> {
    browser.navigate(&portal.issuer_url(symbol)).await?;

    let table = browser
        .find_element(None, &Locator::id(TITLE_TABLE_ID))
        .await
        .map_err(|e| {
            if e.is_no_such_element() {
                MetadataError::ElementsNotFound(format!("'{TITLE_TABLE_ID}' table"))
            } else {
                MetadataError::Browser(e)
            }
        })?;
    let text = browser.text(&table).await?;

    let summary = parse_issuer_summary(symbol, &text);
    debug!(symbol, issuer = %summary.issuer, nominal_value = summary.nominal_value, "read issuer summary");
    Ok(summary)
}
