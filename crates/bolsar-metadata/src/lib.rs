//! Instrument metadata acquisition for the bolsar acquisition engine.
//!
//! This crate provides the metadata pipeline:
//!
//! - [`build_trust_bundle`] - Reconstructs and pins the API's certificate chain
//! - [`obtain_cookie`] - Reads the portal session cookie through a browser
//! - [`HttpSession`] - HTTPS session trusting only the pinned chain
//! - [`MetadataFetcher`] - Per-instrument queries with one session recreation
//! - [`fetch_issuer_summary`] - Issuer name and nominal value from the portal

#![doc(issue_tracker_base_url = "https://github.com/bolsar-tools/bolsar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
mod config;
mod error;
mod fetcher;
mod issuer;
mod session;

pub use chain::{
    CertificateInfo, HttpIssuerSource, IssuerSource, TrustBundle, build_trust_bundle,
    chain_to_pem, fetch_leaf_certificate, walk_chain,
};
pub use config::{API_HOST, MetadataConfig};
pub use error::{MetadataError, TrustChainError};
pub use fetcher::{
    ISSUER_NAME_FIELD, MetadataFetcher, MetadataReport, RetryState, fetch_record, obtain_cookie,
};
pub use issuer::{TITLE_TABLE_ID, fetch_issuer_summary, parse_issuer_summary};
pub use session::{HttpSession, HttpSessionFactory, MetadataTransport, SessionFactory, session_headers};
