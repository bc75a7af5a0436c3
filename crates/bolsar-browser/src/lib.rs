//! Browser automation for the bolsar acquisition engine.
//!
//! This crate provides the browser capability the acquisition pipelines
//! depend on:
//!
//! - [`Browser`] - Navigation, element lookup, text, clicks and cookies
//! - [`Locator`] - Element lookup strategies (CSS, id, tag, class)
//! - [`WebDriverBrowser`] - W3C WebDriver client driving headless Firefox
//! - [`BrowserConfig`] - Browser and driver configuration
//! - `FakeBrowser` - In-memory page for tests (feature `fake`)

#![doc(issue_tracker_base_url = "https://github.com/bolsar-tools/bolsar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod browser;
mod config;
mod driver;
mod webdriver;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use browser::{Browser, BrowserError, ElementRef, Locator};
pub use config::BrowserConfig;
pub use webdriver::WebDriverBrowser;
