//! Core types for the bolsar market data acquisition engine.
//!
//! This crate provides the data model shared by the closing-data and
//! instrument-metadata pipelines:
//!
//! - [`DateKey`] - Trading date that scopes a closing-data acquisition
//! - [`Label`] - Normalized report category name used as a file base name
//! - [`NegotiatedAmounts`] - Negotiated-amounts table as a row/column matrix
//! - [`InstrumentRecord`] - Merged reference metadata for one instrument
//! - [`IssuerSummary`] - Issuer name and nominal value of an instrument
//! - [`AcquisitionState`] - Per-date acquisition state machine
//! - [`FailureKind`] - Classification of a failed acquisition
//! - [`PortalConfig`] - Addresses of the portal pages

#![doc(issue_tracker_base_url = "https://github.com/bolsar-tools/bolsar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod amounts;
mod date_key;
mod error;
mod instrument;
mod label;
mod portal;
mod state;

pub use amounts::{NEGOTIATED_AMOUNTS_FILE, NegotiatedAmounts};
pub use date_key::DateKey;
pub use error::{DateKeyError, FailureKind};
pub use instrument::{InstrumentRecord, IssuerSummary, SYMBOL_FIELD};
pub use label::{Label, PANEL_MARKER};
pub use portal::{CLOSING_URL_TEMPLATE, ISSUER_URL_TEMPLATE, PortalConfig};
pub use state::{AcquisitionState, DestinationStatus};
