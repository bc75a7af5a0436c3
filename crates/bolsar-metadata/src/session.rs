//! HTTP sessions against the metadata API.

use async_trait::async_trait;
use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::chain::{HttpIssuerSource, TrustBundle, build_trust_bundle};
use crate::{MetadataConfig, MetadataError};

/// A live connection to the metadata API.
#[async_trait]
pub trait MetadataTransport: Send + Sync {
    /// POSTs `body` to `endpoint` and returns the parsed JSON answer.
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value, MetadataError>;

    /// Releases the session.
    async fn close(self);
}

/// Builds transports bound to a session cookie.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Transport produced by this factory.
    type Transport: MetadataTransport;

    /// Creates a brand-new session for `cookie`.
    async fn create(&self, cookie: &str) -> Result<Self::Transport, MetadataError>;
}

/// Builds the fixed request headers plus the session cookie.
///
/// # Errors
///
/// Returns [`MetadataError::InvalidHeader`] if a header name or value is not
/// valid.
pub fn session_headers(config: &MetadataConfig, cookie: &str) -> Result<HeaderMap, MetadataError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let invalid = || MetadataError::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        headers.insert(header_name, header_value);
    }

    let cookie = HeaderValue::from_str(&format!("{}={cookie}", config.cookie_name)).map_err(|_| {
        MetadataError::InvalidHeader {
            name: COOKIE.to_string(),
        }
    })?;
    headers.insert(COOKIE, cookie);
    Ok(headers)
}

/// Metadata API session over HTTPS that trusts only the pinned chain.
///
/// The session owns its trust bundle; closing or dropping the session
/// removes the bundle file.
#[derive(Debug)]
pub struct HttpSession {
    client: reqwest::Client,
    bundle: TrustBundle,
}

impl HttpSession {
    /// Creates a session that verifies the API against `bundle` alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the headers are invalid, the bundle cannot be read
    /// or the client cannot be built.
    pub fn new(
        config: &MetadataConfig,
        cookie: &str,
        bundle: TrustBundle,
    ) -> Result<Self, MetadataError> {
        let mut builder = reqwest::Client::builder()
            .default_headers(session_headers(config, cookie)?)
            .tls_built_in_root_certs(false)
            .timeout(config.timeout)
            .gzip(true);
        for anchor in bundle.trust_anchors()? {
            builder = builder.add_root_certificate(anchor);
        }
        let client = builder.build().map_err(MetadataError::Http)?;

        Ok(Self { client, bundle })
    }

    /// Returns the trust bundle backing this session.
    #[must_use]
    pub const fn bundle(&self) -> &TrustBundle {
        &self.bundle
    }
}

#[async_trait]
impl MetadataTransport for HttpSession {
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value, MetadataError> {
        let response = self.client.post(endpoint).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| MetadataError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    async fn close(self) {
        debug!(bundle = %self.bundle.path().display(), "closing metadata session");
    }
}

/// Creates [`HttpSession`]s, each with a freshly built trust bundle.
#[derive(Debug, Clone)]
pub struct HttpSessionFactory {
    config: MetadataConfig,
    issuers: HttpIssuerSource,
}

impl HttpSessionFactory {
    /// Creates a factory.
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer download client cannot be created.
    pub fn new(config: MetadataConfig) -> Result<Self, MetadataError> {
        let issuers = HttpIssuerSource::new(&config)?;
        Ok(Self { config, issuers })
    }
}

#[async_trait]
impl SessionFactory for HttpSessionFactory {
    type Transport = HttpSession;

    async fn create(&self, cookie: &str) -> Result<HttpSession, MetadataError> {
        let bundle = build_trust_bundle(&self.config, &self.issuers).await?;
        HttpSession::new(&self.config, cookie, bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_headers() {
        let config = MetadataConfig::default();
        let headers = session_headers(&config, "abc123").unwrap();

        assert_eq!(headers.get(COOKIE).unwrap(), "JSESSIONID=abc123");
        assert_eq!(
            headers.get("referer").unwrap(),
            "https://open.bymadata.com.ar/"
        );
        assert_eq!(headers.get("dnt").unwrap(), "1");
    }

    #[test]
    fn test_invalid_cookie_rejected() {
        let config = MetadataConfig::default();
        let err = session_headers(&config, "bad\nvalue").unwrap_err();
        assert!(matches!(err, MetadataError::InvalidHeader { .. }));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut config = MetadataConfig::default();
        config.headers.push(("Bad Header".to_string(), "x".to_string()));
        let err = session_headers(&config, "abc").unwrap_err();
        assert!(matches!(err, MetadataError::InvalidHeader { name } if name == "Bad Header"));
    }
}
