//! Metadata API configuration.

use std::time::Duration;

/// Metadata API host.
pub const API_HOST: &str = "open.bymadata.com.ar";

/// Base of the technical-sheet endpoints.
const FICHA_TECNICA_URL: &str =
    "https://open.bymadata.com.ar/vanoms-be-core/rest/api/bymadata/free/bnown/fichatecnica/";

/// Configuration for the metadata session.
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    /// API host probed for the certificate chain.
    pub host: String,
    /// API port.
    pub port: u16,
    /// Page that makes the portal start a server session.
    pub dashboard_url: String,
    /// Page visited after the dashboard; it sets the session cookie.
    pub cookie_bootstrap_url: String,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Company data endpoint; its first `data` element is merged wholesale.
    pub company_endpoint: String,
    /// Instrument endpoint; its first `data` element names the issuer.
    pub species_endpoint: String,
    /// Fixed headers sent with every query.
    pub headers: Vec<(String, String)>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum number of certificates in the pinned chain.
    pub max_chain_depth: usize,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        let headers = [
            (
                "User-Agent",
                "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0",
            ),
            ("Accept", "application/json, text/plain, */*"),
            ("Accept-Language", "en-US,en;q=0.5"),
            ("Referer", "https://open.bymadata.com.ar/"),
            ("Content-Type", "application/json"),
            ("Origin", "https://open.bymadata.com.ar"),
            ("DNT", "1"),
            ("Sec-Fetch-Dest", "empty"),
            ("Sec-Fetch-Mode", "cors"),
            ("Sec-Fetch-Site", "same-origin"),
        ];

        Self {
            host: API_HOST.to_string(),
            port: 443,
            dashboard_url: "https://open.bymadata.com.ar/#/dashboard".to_string(),
            cookie_bootstrap_url: FICHA_TECNICA_URL.to_string(),
            cookie_name: "JSESSIONID".to_string(),
            company_endpoint: format!("{FICHA_TECNICA_URL}sociedades/general"),
            species_endpoint: format!("{FICHA_TECNICA_URL}especies/general"),
            headers: headers
                .iter()
                .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
                .collect(),
            timeout: Duration::from_secs(30),
            max_chain_depth: 8,
        }
    }
}

impl MetadataConfig {
    /// Returns the `https://host:port/` origin probed for the leaf
    /// certificate.
    #[must_use]
    pub fn probe_url(&self) -> String {
        format!("https://{}:{}/", self.host, self.port)
    }
}
