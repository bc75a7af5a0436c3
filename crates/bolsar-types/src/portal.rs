//! Portal page addresses.

use crate::DateKey;

/// Default closing page, one per trading date.
pub const CLOSING_URL_TEMPLATE: &str = "https://bolsar.info/cierre/cierre_{date}.html";

/// Default per-instrument information page.
pub const ISSUER_URL_TEMPLATE: &str = "https://bolsar.info/infoEspecie.php?especie={symbol}";

/// Addresses of the exchange information portal pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Closing page template; `{date}` is replaced by the `YYYY-MM-DD` key.
    pub closing_url_template: String,
    /// Instrument page template; `{symbol}` is replaced by the symbol.
    pub issuer_url_template: String,
    /// Page loaded after a date completes so the next one starts clean.
    pub reset_url: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            closing_url_template: CLOSING_URL_TEMPLATE.to_string(),
            issuer_url_template: ISSUER_URL_TEMPLATE.to_string(),
            reset_url: "about:blank".to_string(),
        }
    }
}

impl PortalConfig {
    /// Returns the closing page URL for a date.
    ///
    /// # Example
    ///
    /// ```
    /// use bolsar_types::{DateKey, PortalConfig};
    ///
    /// let date = DateKey::parse("2023-07-14").unwrap();
    /// let url = PortalConfig::default().closing_url(date);
    /// assert_eq!(url, "https://bolsar.info/cierre/cierre_2023-07-14.html");
    /// ```
    #[must_use]
    pub fn closing_url(&self, date: DateKey) -> String {
        self.closing_url_template
            .replace("{date}", &date.to_string())
    }

    /// Returns the information page URL for an instrument symbol.
    #[must_use]
    pub fn issuer_url(&self, symbol: &str) -> String {
        self.issuer_url_template.replace("{symbol}", symbol)
    }
}
