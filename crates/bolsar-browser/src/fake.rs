//! In-memory browser for tests.
//!
//! [`FakeBrowser`] serves a fixed element tree, records navigations and
//! clicks, and can drop a file into a download directory whenever a
//! download button is clicked.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{Browser, BrowserError, ElementRef, Locator};

const ID_PREFIX: &str = "fake-";

#[derive(Debug, Clone)]
struct FakeNode {
    locators: Vec<Locator>,
    text: String,
    children: Vec<usize>,
    downloads: bool,
}

/// Browser double backed by a static element tree.
#[derive(Debug, Default)]
pub struct FakeBrowser {
    nodes: Vec<FakeNode>,
    roots: Vec<usize>,
    cookies: HashMap<String, String>,
    pending_downloads: Mutex<VecDeque<PathBuf>>,
    navigations: Mutex<Vec<String>>,
    clicks: Mutex<Vec<ElementRef>>,
    closed: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FakeBrowser {
    /// Creates an empty page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an element below `parent` (or at document level) and returns its
    /// index.
    pub fn add_element(
        &mut self,
        parent: Option<usize>,
        locators: Vec<Locator>,
        text: impl Into<String>,
    ) -> usize {
        let index = self.nodes.len();
        self.nodes.push(FakeNode {
            locators,
            text: text.into(),
            children: Vec::new(),
            downloads: false,
        });
        match parent {
            Some(parent) => self.nodes[parent].children.push(index),
            None => self.roots.push(index),
        }
        index
    }

    /// Adds a document-level element.
    #[must_use]
    pub fn with_element(mut self, locator: Locator, text: impl Into<String>) -> Self {
        self.add_element(None, vec![locator], text);
        self
    }

    /// Adds one `span.mercados` label per text, in order.
    #[must_use]
    pub fn with_labels(mut self, texts: &[&str]) -> Self {
        for text in texts {
            self.add_element(None, vec![Locator::css("span.mercados")], *text);
        }
        self
    }

    /// Adds one `buttons-csv` button per file name. Each click writes the
    /// next queued file into `download_dir`.
    #[must_use]
    pub fn with_download_buttons(mut self, download_dir: &Path, file_names: &[&str]) -> Self {
        for name in file_names {
            let index = self.add_element(None, vec![Locator::class("buttons-csv")], "CSV");
            self.nodes[index].downloads = true;
            lock(&self.pending_downloads).push_back(download_dir.join(name));
        }
        self
    }

    /// Adds a `table#id > tbody > tr > td` structure holding `rows`.
    #[must_use]
    pub fn with_table(mut self, id: &str, rows: &[&[&str]]) -> Self {
        let table = self.add_element(None, vec![Locator::id(id), Locator::tag("table")], "");
        let body = self.add_element(Some(table), vec![Locator::tag("tbody")], "");
        for row in rows {
            let tr = self.add_element(Some(body), vec![Locator::tag("tr")], row.join(" "));
            for cell in *row {
                self.add_element(Some(tr), vec![Locator::tag("td")], *cell);
            }
        }
        self
    }

    /// Sets a cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name.to_string(), value.to_string());
        self
    }

    /// Returns every URL navigated to, in order.
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        lock(&self.navigations).clone()
    }

    /// Returns the number of clicks performed.
    #[must_use]
    pub fn click_count(&self) -> usize {
        lock(&self.clicks).len()
    }

    /// Returns true once [`Browser::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn node(&self, element: &ElementRef) -> Result<&FakeNode, BrowserError> {
        element
            .id()
            .strip_prefix(ID_PREFIX)
            .and_then(|index| index.parse::<usize>().ok())
            .and_then(|index| self.nodes.get(index))
            .ok_or_else(|| BrowserError::NoSuchElement(element.id().to_string()))
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        lock(&self.navigations).push(url.to_string());
        Ok(())
    }

    async fn find_elements(
        &self,
        scope: Option<&ElementRef>,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>, BrowserError> {
        let candidates = match scope {
            Some(element) => &self.node(element)?.children,
            None => &self.roots,
        };
        Ok(candidates
            .iter()
            .filter(|&&index| self.nodes[index].locators.contains(locator))
            .map(|index| ElementRef::new(format!("{ID_PREFIX}{index}")))
            .collect())
    }

    async fn text(&self, element: &ElementRef) -> Result<String, BrowserError> {
        Ok(self.node(element)?.text.clone())
    }

    async fn click(&self, element: &ElementRef) -> Result<(), BrowserError> {
        let node = self.node(element)?;
        lock(&self.clicks).push(element.clone());
        if node.downloads
            && let Some(path) = lock(&self.pending_downloads).pop_front()
        {
            std::fs::write(&path, b"simulated download").map_err(|e| {
                BrowserError::Protocol(format!("fake download to {}: {e}", path.display()))
            })?;
        }
        Ok(())
    }

    async fn cookie(&self, name: &str) -> Result<Option<String>, BrowserError> {
        Ok(self.cookies.get(name).cloned())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_and_text() {
        let browser = FakeBrowser::new().with_labels(&["Acciones", "Bonos"]);
        let labels = browser
            .find_elements(None, &Locator::css("span.mercados"))
            .await
            .unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(browser.text(&labels[1]).await.unwrap(), "Bonos");
    }

    #[tokio::test]
    async fn test_nested_table() {
        let browser = FakeBrowser::new().with_table("tabla", &[&["a", "b"], &["1", "2"]]);
        let table = browser.find_element(None, &Locator::id("tabla")).await.unwrap();
        let body = browser
            .find_element(Some(&table), &Locator::tag("tbody"))
            .await
            .unwrap();
        let rows = browser
            .find_elements(Some(&body), &Locator::tag("tr"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        let cells = browser
            .find_elements(Some(&rows[1]), &Locator::tag("td"))
            .await
            .unwrap();
        assert_eq!(browser.text(&cells[0]).await.unwrap(), "1");
    }

    #[tokio::test]
    async fn test_find_element_missing() {
        let browser = FakeBrowser::new();
        let err = browser
            .find_element(None, &Locator::id("tabla"))
            .await
            .unwrap_err();
        assert!(err.is_no_such_element());
    }

    #[tokio::test]
    async fn test_click_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let browser = FakeBrowser::new().with_download_buttons(dir.path(), &["x.csv", "yy.csv"]);
        let buttons = browser
            .find_elements(None, &Locator::class("buttons-csv"))
            .await
            .unwrap();
        for button in &buttons {
            browser.click(button).await.unwrap();
        }
        assert_eq!(browser.click_count(), 2);
        assert!(dir.path().join("x.csv").exists());
        assert!(dir.path().join("yy.csv").exists());
    }

    #[tokio::test]
    async fn test_navigation_and_cookie() {
        let browser = FakeBrowser::new().with_cookie("JSESSIONID", "abc123");
        browser.navigate("https://example.test/").await.unwrap();
        assert_eq!(browser.navigations(), vec!["https://example.test/".to_string()]);
        assert_eq!(
            browser.cookie("JSESSIONID").await.unwrap(),
            Some("abc123".to_string())
        );
        assert_eq!(browser.cookie("other").await.unwrap(), None);
        browser.close().await.unwrap();
        assert!(browser.is_closed());
    }
}
