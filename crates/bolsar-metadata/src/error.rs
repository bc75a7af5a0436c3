//! Metadata acquisition error types.

use bolsar_browser::BrowserError;
use bolsar_types::FailureKind;
use thiserror::Error;

/// Errors that can occur while building the pinned certificate chain.
#[derive(Error, Debug)]
pub enum TrustChainError {
    /// The TLS probe of the API host failed.
    #[error("Failed to connect to {host}:{port}: {source}")]
    Connect {
        /// Probed host.
        host: String,
        /// Probed port.
        port: u16,
        /// The underlying HTTP error.
        source: reqwest::Error,
    },

    /// An HTTP client for the chain walk could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The host did not present a certificate.
    #[error("No peer certificate presented by {host}:{port}")]
    NoPeerCertificate {
        /// Probed host.
        host: String,
        /// Probed port.
        port: u16,
    },

    /// A certificate could not be parsed.
    #[error("Invalid certificate: {0}")]
    Parse(String),

    /// A non-root certificate names no issuer location.
    #[error("Certificate '{subject}' has no issuer URL, the chain is broken")]
    NoIssuerUrl {
        /// Subject of the certificate whose issuer is unknown.
        subject: String,
    },

    /// An issuer certificate could not be downloaded.
    #[error("Failed to fetch issuer certificate from {url}: {source}")]
    FetchIssuer {
        /// The issuer location.
        url: String,
        /// The underlying HTTP error.
        source: reqwest::Error,
    },

    /// An issuer location answered with something other than a certificate.
    #[error("Issuer location {url} did not return a certificate: {reason}")]
    InvalidIssuer {
        /// The issuer location.
        url: String,
        /// What was wrong with the answer.
        reason: String,
    },

    /// No self-signed certificate was reached within the depth bound.
    #[error("No root certificate within {0} links")]
    TooDeep(usize),

    /// The trust bundle could not be written or read back.
    #[error("Trust bundle I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while acquiring instrument metadata.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Connection-level failure; the only kind eligible for a session retry.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Any other HTTP client failure.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{endpoint} answered with status {status}")]
    Status {
        /// Queried endpoint.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },

    /// The pinned certificate chain could not be built.
    #[error(transparent)]
    TrustChain(#[from] TrustChainError),

    /// The browser failed.
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// The portal did not set the session cookie.
    #[error("Session cookie '{0}' was not set by the portal")]
    MissingCookie(String),

    /// A configured header is not a valid HTTP header.
    #[error("Invalid header '{name}'")]
    InvalidHeader {
        /// Header name.
        name: String,
    },

    /// The response body was not the expected JSON.
    #[error("Unexpected response from {endpoint}: {reason}")]
    Decode {
        /// Queried endpoint.
        endpoint: String,
        /// What was wrong with the body.
        reason: String,
    },

    /// Expected page structure was absent.
    #[error("Unable to locate the {0}, probably the page layout changed or the URL is wrong")]
    ElementsNotFound(String),
}

impl MetadataError {
    /// Returns true for connection-level failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::Transport,
            Self::TrustChain(_) => FailureKind::TrustChain,
            Self::Browser(_) => FailureKind::Browser,
            Self::ElementsNotFound(_) => FailureKind::ElementsNotFound,
            Self::Http(_)
            | Self::Status { .. }
            | Self::MissingCookie(_)
            | Self::InvalidHeader { .. }
            | Self::Decode { .. } => FailureKind::Other,
        }
    }
}

impl From<reqwest::Error> for MetadataError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_request() {
            Self::Transport(Box::new(e))
        } else {
            Self::Http(e)
        }
    }
}
