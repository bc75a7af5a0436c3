//! Certificate chain reconstruction and trust bundle materialization.
//!
//! The API host's leaf certificate is captured from a TLS handshake, then
//! each certificate's Authority Information Access `caIssuers` location is
//! followed until a self-signed root is reached. The resulting leaf-to-root
//! chain is written as a PEM bundle to a temporary file that lives exactly as
//! long as the [`TrustBundle`] value.

use async_trait::async_trait;
use reqwest::tls::TlsInfo;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::oid_registry::OID_PKIX_ACCESS_DESCRIPTOR_CA_ISSUERS;
use x509_parser::parse_x509_certificate;

use crate::{MetadataConfig, TrustChainError};

const PEM_TAG: &str = "CERTIFICATE";

/// A parsed X.509 certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    der: Vec<u8>,
    subject: String,
    self_signed: bool,
    issuer_urls: Vec<String>,
}

impl CertificateInfo {
    /// Parses a DER-encoded certificate.
    ///
    /// # Errors
    ///
    /// Returns [`TrustChainError::Parse`] if the bytes are not a certificate.
    pub fn from_der(der: Vec<u8>) -> Result<Self, TrustChainError> {
        let (subject, self_signed, issuer_urls) = inspect(&der)?;
        Ok(Self {
            der,
            subject,
            self_signed,
            issuer_urls,
        })
    }

    /// Parses a certificate served either as DER or as PEM.
    ///
    /// # Errors
    ///
    /// Returns [`TrustChainError::Parse`] if neither encoding yields a
    /// certificate.
    pub fn from_der_or_pem(bytes: &[u8]) -> Result<Self, TrustChainError> {
        if bytes.starts_with(b"-----BEGIN") {
            let pem = pem::parse(bytes).map_err(|e| TrustChainError::Parse(e.to_string()))?;
            return Self::from_der(pem.into_contents());
        }
        Self::from_der(bytes.to_vec())
    }

    /// Returns the DER encoding.
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Returns the subject distinguished name.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns true if subject and issuer are the same name.
    #[must_use]
    pub const fn is_self_signed(&self) -> bool {
        self.self_signed
    }

    /// Returns the `caIssuers` locations, in certificate order.
    #[must_use]
    pub fn issuer_urls(&self) -> &[String] {
        &self.issuer_urls
    }
}

fn inspect(der: &[u8]) -> Result<(String, bool, Vec<String>), TrustChainError> {
    let (_, cert) = parse_x509_certificate(der).map_err(|e| TrustChainError::Parse(e.to_string()))?;

    let mut issuer_urls = Vec::new();
    for extension in cert.extensions() {
        if let ParsedExtension::AuthorityInfoAccess(aia) = extension.parsed_extension() {
            for description in &aia.accessdescs {
                if description.access_method == OID_PKIX_ACCESS_DESCRIPTOR_CA_ISSUERS
                    && let GeneralName::URI(uri) = &description.access_location
                {
                    issuer_urls.push((*uri).to_string());
                }
            }
        }
    }

    let self_signed = cert.subject().as_raw() == cert.issuer().as_raw();
    Ok((cert.subject().to_string(), self_signed, issuer_urls))
}

/// Source of issuer certificates.
#[async_trait]
pub trait IssuerSource: Send + Sync {
    /// Fetches the certificate published at `url`.
    async fn fetch_issuer(&self, url: &str) -> Result<CertificateInfo, TrustChainError>;
}

/// Downloads issuer certificates over HTTP.
#[derive(Debug, Clone)]
pub struct HttpIssuerSource {
    client: reqwest::Client,
}

impl HttpIssuerSource {
    /// Creates a source using the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &MetadataConfig) -> Result<Self, TrustChainError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(TrustChainError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl IssuerSource for HttpIssuerSource {
    async fn fetch_issuer(&self, url: &str) -> Result<CertificateInfo, TrustChainError> {
        let fetch_error = |source| TrustChainError::FetchIssuer {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_error)?;
        let body = response.bytes().await.map_err(fetch_error)?;

        CertificateInfo::from_der_or_pem(&body).map_err(|e| TrustChainError::InvalidIssuer {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Captures the certificate the API host presents.
///
/// The probe only reads the handshake; its own verification is disabled
/// because the chain it returns is what later sessions verify against.
///
/// # Errors
///
/// Returns an error if the host is unreachable or presents no certificate.
pub async fn fetch_leaf_certificate(
    config: &MetadataConfig,
) -> Result<CertificateInfo, TrustChainError> {
    let connect_error = |source| TrustChainError::Connect {
        host: config.host.clone(),
        port: config.port,
        source,
    };

    let client = reqwest::Client::builder()
        .tls_info(true)
        .danger_accept_invalid_certs(true)
        .timeout(config.timeout)
        .build()
        .map_err(TrustChainError::Client)?;
    let response = client
        .head(config.probe_url())
        .send()
        .await
        .map_err(connect_error)?;

    let der = response
        .extensions()
        .get::<TlsInfo>()
        .and_then(TlsInfo::peer_certificate)
        .ok_or_else(|| TrustChainError::NoPeerCertificate {
            host: config.host.clone(),
            port: config.port,
        })?;
    CertificateInfo::from_der(der.to_vec())
}

/// Follows issuer locations from `leaf` up to a self-signed certificate.
///
/// Returns the chain ordered leaf to root. The first issuer location of
/// each certificate is used.
///
/// # Errors
///
/// Returns an error on any break in the chain: a certificate without issuer
/// location, an issuer that cannot be fetched, or more than `max_depth`
/// certificates.
pub async fn walk_chain<S: IssuerSource + ?Sized>(
    leaf: CertificateInfo,
    source: &S,
    max_depth: usize,
) -> Result<Vec<CertificateInfo>, TrustChainError> {
    let mut chain = Vec::new();
    let mut current = leaf;

    loop {
        if current.is_self_signed() {
            chain.push(current);
            return Ok(chain);
        }
        if chain.len() + 1 >= max_depth {
            return Err(TrustChainError::TooDeep(max_depth));
        }

        let url = current
            .issuer_urls()
            .first()
            .cloned()
            .ok_or_else(|| TrustChainError::NoIssuerUrl {
                subject: current.subject().to_string(),
            })?;
        debug!(subject = current.subject(), %url, "fetching issuer certificate");
        let issuer = source.fetch_issuer(&url).await?;
        chain.push(std::mem::replace(&mut current, issuer));
    }
}

/// Serializes a chain as concatenated PEM blocks, leaf first.
#[must_use]
pub fn chain_to_pem(chain: &[CertificateInfo]) -> String {
    let blocks: Vec<pem::Pem> = chain
        .iter()
        .map(|cert| pem::Pem::new(PEM_TAG, cert.der().to_vec()))
        .collect();
    pem::encode_many(&blocks)
}

/// A certificate chain written to a temporary PEM file.
///
/// The file is removed when the bundle is dropped.
#[derive(Debug)]
pub struct TrustBundle {
    file: NamedTempFile,
    certificates: usize,
}

impl TrustBundle {
    /// Writes `chain` to a fresh temporary file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write(chain: &[CertificateInfo]) -> Result<Self, TrustChainError> {
        let mut file = tempfile::Builder::new()
            .prefix("bolsar-chain-")
            .suffix(".pem")
            .tempfile()?;
        file.write_all(chain_to_pem(chain).as_bytes())?;
        file.flush()?;
        Ok(Self {
            file,
            certificates: chain.len(),
        })
    }

    /// Returns the bundle path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Returns the number of certificates in the bundle.
    #[must_use]
    pub const fn certificate_count(&self) -> usize {
        self.certificates
    }

    /// Reads the bundle back as trust anchors for an HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds no certificate.
    pub fn trust_anchors(&self) -> Result<Vec<reqwest::Certificate>, TrustChainError> {
        let contents = std::fs::read(self.path())?;
        let blocks = pem::parse_many(contents).map_err(|e| TrustChainError::Parse(e.to_string()))?;
        if blocks.is_empty() {
            return Err(TrustChainError::Parse(format!(
                "no certificate in '{}'",
                self.path().display()
            )));
        }
        blocks
            .iter()
            .map(|block| {
                reqwest::Certificate::from_der(block.contents())
                    .map_err(|e| TrustChainError::Parse(e.to_string()))
            })
            .collect()
    }
}

/// Captures, walks and materializes the API host's certificate chain.
///
/// # Errors
///
/// Returns an error if any step fails; there is no fallback to the default
/// trust store.
pub async fn build_trust_bundle<S: IssuerSource + ?Sized>(
    config: &MetadataConfig,
    source: &S,
) -> Result<TrustBundle, TrustChainError> {
    let leaf = fetch_leaf_certificate(config).await?;
    let chain = walk_chain(leaf, source, config.max_chain_depth).await?;
    let bundle = TrustBundle::write(&chain)?;
    info!(
        host = %config.host,
        certificates = chain.len(),
        path = %bundle.path().display(),
        "pinned certificate chain"
    );
    Ok(bundle)
}
