//! Closing data and instrument metadata acquisition for the bolsar exchange
//! portal.
//!
//! This is a facade crate that re-exports functionality from the bolsar
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use bolsar_lib::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloads = std::env::temp_dir().join("bolsar-downloads");
//!     std::fs::create_dir_all(&downloads)?;
//!
//!     let browser = WebDriverBrowser::launch(
//!         &BrowserConfig::default().with_download_dir(&downloads),
//!     )
//!     .await?;
//!     let acquirer = ClosingAcquirer::new(
//!         &browser,
//!         PortalConfig::default(),
//!         ClosingConfig::new(&downloads, "data").with_negotiated_amounts(true),
//!     );
//!
//!     for outcome in acquirer.run_dates(&[DateKey::parse("2023-07-14")?]).await {
//!         println!("{}: {}", outcome.date(), outcome.state());
//!     }
//!
//!     browser.close().await?;
//!     Ok(())
//! }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/bolsar-tools/bolsar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use bolsar_types::*;

// Re-export browser capability
pub use bolsar_browser::{Browser, BrowserConfig, BrowserError, ElementRef, Locator, WebDriverBrowser};

#[cfg(feature = "fake")]
pub use bolsar_browser::fake;

// Re-export closing-data pipeline
#[cfg(feature = "closing")]
pub use bolsar_closing::{
    ClosingAcquirer, ClosingConfig, ClosingError, ClosingReport, DateOutcome, ReconciledFile,
    discard_downloads, extract_labels, extract_negotiated_amounts, reconcile, reconciliation_order,
    wait_for_downloads, write_negotiated_amounts,
};

// Re-export metadata pipeline
#[cfg(feature = "metadata")]
pub use bolsar_metadata::{
    CertificateInfo, HttpIssuerSource, HttpSession, HttpSessionFactory, IssuerSource,
    MetadataConfig, MetadataError, MetadataFetcher, MetadataReport, MetadataTransport,
    RetryState, SessionFactory, TrustBundle, TrustChainError, build_trust_bundle,
    fetch_issuer_summary, obtain_cookie, walk_chain,
};

/// Prelude module for convenient imports.
///
/// ```
/// use bolsar_lib::prelude::*;
/// ```
pub mod prelude {
    pub use bolsar_types::{
        AcquisitionState, DateKey, DestinationStatus, FailureKind, InstrumentRecord,
        IssuerSummary, Label, NegotiatedAmounts, PortalConfig,
    };

    pub use bolsar_browser::{Browser, BrowserConfig, WebDriverBrowser};

    #[cfg(feature = "closing")]
    pub use bolsar_closing::{ClosingAcquirer, ClosingConfig, ClosingError, DateOutcome};

    #[cfg(feature = "metadata")]
    pub use bolsar_metadata::{
        HttpSessionFactory, MetadataConfig, MetadataError, MetadataFetcher, fetch_issuer_summary,
    };
}
