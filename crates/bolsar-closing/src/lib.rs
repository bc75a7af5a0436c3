//! Closing-data acquisition for the bolsar exchange portal.
//!
//! This crate drives the closing-data pipeline for one trading date:
//!
//! - [`extract_labels`] - Reads report labels and triggers their downloads
//! - [`wait_for_downloads`] - Waits for triggered downloads to land
//! - [`discard_downloads`] - Clears leftover downloads between dates
//! - [`reconcile`] - Pairs downloaded files with labels and moves them
//! - [`extract_negotiated_amounts`] - Reads the negotiated-amounts table
//! - [`ClosingAcquirer`] - Per-date orchestration with idempotency guard

#![doc(issue_tracker_base_url = "https://github.com/bolsar-tools/bolsar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod amounts;
mod config;
mod downloads;
mod error;
mod labels;
mod orchestrator;
mod reconcile;

pub use amounts::{AMOUNTS_TABLE_ID, extract_negotiated_amounts, write_negotiated_amounts};
pub use config::ClosingConfig;
pub use downloads::{discard_downloads, wait_for_downloads};
pub use error::ClosingError;
pub use labels::{DOWNLOAD_BUTTON_CLASS, LABEL_SELECTOR, extract_labels};
pub use orchestrator::{ClosingAcquirer, ClosingReport, DateOutcome};
pub use reconcile::{ReconciledFile, reconcile, reconciliation_order};
