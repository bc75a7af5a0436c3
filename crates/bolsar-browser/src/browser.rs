//! Browser capability abstraction.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while driving the browser.
#[derive(Error, Debug)]
pub enum BrowserError {
    /// HTTP request to the WebDriver endpoint failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No element matched the locator.
    #[error("No such element: {0}")]
    NoSuchElement(String),

    /// The browser session could not be created (missing binary, bad options).
    #[error("Browser session could not be created: {0}")]
    SessionNotCreated(String),

    /// WebDriver reported an error.
    #[error("WebDriver error '{error}': {message}")]
    WebDriver {
        /// W3C error code.
        error: String,
        /// Driver-provided message.
        message: String,
    },

    /// WebDriver answered with an unexpected payload.
    #[error("Unexpected WebDriver response: {0}")]
    Protocol(String),

    /// The WebDriver executable could not be started.
    #[error("Failed to start WebDriver '{executable}': {source}")]
    SpawnDriver {
        /// The executable that could not be spawned.
        executable: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The WebDriver process did not report ready in time.
    #[error("WebDriver not ready after {0:?}")]
    DriverTimeout(Duration),
}

impl BrowserError {
    /// Returns true if the error means the searched element is absent.
    #[must_use]
    pub const fn is_no_such_element(&self) -> bool {
        matches!(self, Self::NoSuchElement(_))
    }
}

/// Strategy used to locate elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// CSS selector, e.g. `span.mercados`.
    Css(String),
    /// Element id attribute.
    Id(String),
    /// Tag name, e.g. `tbody`.
    TagName(String),
    /// Single class name, e.g. `buttons-csv`.
    ClassName(String),
}

impl Locator {
    /// CSS selector locator.
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Id locator.
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Tag name locator.
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self::TagName(name.into())
    }

    /// Class name locator.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::ClassName(name.into())
    }

    /// Returns the W3C WebDriver `(using, value)` pair for this locator.
    ///
    /// W3C has no id or class strategy, so both map to CSS selectors.
    #[must_use]
    pub fn w3c_strategy(&self) -> (&'static str, String) {
        match self {
            Self::Css(selector) => ("css selector", selector.clone()),
            Self::Id(id) => ("css selector", format!("[id=\"{id}\"]")),
            Self::TagName(name) => ("tag name", name.clone()),
            Self::ClassName(name) => ("css selector", format!(".{name}")),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(selector) => write!(f, "css '{selector}'"),
            Self::Id(id) => write!(f, "id '{id}'"),
            Self::TagName(name) => write!(f, "tag '{name}'"),
            Self::ClassName(name) => write!(f, "class '{name}'"),
        }
    }
}

/// Opaque reference to an element on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(String);

impl ElementRef {
    /// Wraps a driver-assigned element id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the driver-assigned element id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Browser automation capability.
///
/// One browser session is owned by one acquisition run; it is not reentrant.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Navigates the current tab to `url`.
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Finds every element matching `locator`, searching below `scope` when
    /// given and in the whole document otherwise.
    ///
    /// An empty result is not an error.
    async fn find_elements(
        &self,
        scope: Option<&ElementRef>,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>, BrowserError>;

    /// Finds the first element matching `locator`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::NoSuchElement`] if nothing matches.
    async fn find_element(
        &self,
        scope: Option<&ElementRef>,
        locator: &Locator,
    ) -> Result<ElementRef, BrowserError> {
        self.find_elements(scope, locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::NoSuchElement(locator.to_string()))
    }

    /// Returns the rendered text of an element.
    async fn text(&self, element: &ElementRef) -> Result<String, BrowserError>;

    /// Clicks an element.
    async fn click(&self, element: &ElementRef) -> Result<(), BrowserError>;

    /// Returns the value of the named cookie, if set.
    async fn cookie(&self, name: &str) -> Result<Option<String>, BrowserError>;

    /// Ends the browser session.
    async fn close(&self) -> Result<(), BrowserError>;
}
