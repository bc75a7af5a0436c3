//! W3C WebDriver client.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::driver::DriverProcess;
use crate::{Browser, BrowserConfig, BrowserError, ElementRef, Locator};

/// Key under which W3C WebDriver returns element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// MIME types saved to the download directory without a prompt.
const SAVE_WITHOUT_ASKING: &str = "text/csv,application/csv,application/octet-stream";

/// Browser session driven through the W3C WebDriver protocol.
///
/// Talks JSON over HTTP to a WebDriver endpoint, spawning `geckodriver`
/// when no external endpoint is configured.
#[derive(Debug)]
pub struct WebDriverBrowser {
    http: Client,
    base_url: String,
    session_id: String,
    _driver: Option<DriverProcess>,
}

impl WebDriverBrowser {
    /// Launches a browser session with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::SessionNotCreated`] if the browser cannot be
    /// started, or another error if the driver is unreachable.
    pub async fn launch(config: &BrowserConfig) -> Result<Self, BrowserError> {
        let http = Client::builder()
            .timeout(config.command_timeout)
            .tcp_nodelay(true)
            .build()?;

        let (base_url, driver) = match &config.webdriver_url {
            Some(url) => (url.trim_end_matches('/').to_string(), None),
            None => {
                let driver = DriverProcess::spawn(&config.driver_binary, config.driver_port)?;
                driver
                    .wait_until_ready(&http, config.driver_startup_timeout)
                    .await?;
                (driver.url(), Some(driver))
            }
        };

        let response = send(
            &http,
            Method::POST,
            &format!("{base_url}/session"),
            Some(capabilities(config)),
        )
        .await?;
        let session_id = response
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| BrowserError::Protocol("missing sessionId".to_string()))?
            .to_string();

        info!(session = %session_id, headless = config.headless, "browser session created");
        Ok(Self {
            http,
            base_url,
            session_id,
            _driver: driver,
        })
    }

    /// Sends a command scoped to this session.
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, BrowserError> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        send(&self.http, method, &url, body).await
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        debug!(url, "navigate");
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn find_elements(
        &self,
        scope: Option<&ElementRef>,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>, BrowserError> {
        let (using, value) = locator.w3c_strategy();
        let path = match scope {
            Some(element) => format!("/element/{}/elements", element.id()),
            None => "/elements".to_string(),
        };
        let found = self
            .command(
                Method::POST,
                &path,
                Some(json!({ "using": using, "value": value })),
            )
            .await?;
        element_refs(found)
    }

    async fn text(&self, element: &ElementRef) -> Result<String, BrowserError> {
        let text = self
            .command(Method::GET, &format!("/element/{}/text", element.id()), None)
            .await?;
        text.as_str()
            .map(str::to_string)
            .ok_or_else(|| BrowserError::Protocol(format!("element text is not a string: {text}")))
    }

    async fn click(&self, element: &ElementRef) -> Result<(), BrowserError> {
        self.command(
            Method::POST,
            &format!("/element/{}/click", element.id()),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    async fn cookie(&self, name: &str) -> Result<Option<String>, BrowserError> {
        match self
            .command(Method::GET, &format!("/cookie/{name}"), None)
            .await
        {
            Ok(cookie) => Ok(cookie
                .get("value")
                .and_then(Value::as_str)
                .map(str::to_string)),
            Err(BrowserError::WebDriver { error, .. }) if error == "no such cookie" => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.command(Method::DELETE, "", None).await?;
        info!(session = %self.session_id, "browser session closed");
        Ok(())
    }
}

/// Sends a WebDriver request and unwraps the `value` member of the reply.
async fn send(
    http: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<Value, BrowserError> {
    let mut request = http.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    let mut payload: Value = response.json().await?;
    let value = payload
        .get_mut("value")
        .map(Value::take)
        .unwrap_or(Value::Null);

    if status.is_success() {
        Ok(value)
    } else {
        Err(command_error(&value))
    }
}

/// Maps a W3C error payload to a [`BrowserError`].
fn command_error(value: &Value) -> BrowserError {
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let error = field("error");
    let message = field("message");

    match error.as_str() {
        "no such element" => BrowserError::NoSuchElement(message),
        "session not created" => BrowserError::SessionNotCreated(message),
        _ => BrowserError::WebDriver { error, message },
    }
}

/// Extracts element references from a find-elements reply.
fn element_refs(found: Value) -> Result<Vec<ElementRef>, BrowserError> {
    let Value::Array(items) = found else {
        return Err(BrowserError::Protocol(format!(
            "expected element array, got {found}"
        )));
    };

    items
        .iter()
        .map(|item| {
            item.get(ELEMENT_KEY)
                .and_then(Value::as_str)
                .map(ElementRef::new)
                .ok_or_else(|| BrowserError::Protocol(format!("malformed element: {item}")))
        })
        .collect()
}

/// Builds the new-session capabilities for headless Firefox.
fn capabilities(config: &BrowserConfig) -> Value {
    let mut prefs = Map::new();
    if let Some(dir) = &config.download_dir {
        prefs.insert("browser.download.folderList".into(), json!(2));
        prefs.insert(
            "browser.download.dir".into(),
            json!(dir.display().to_string()),
        );
        prefs.insert("browser.download.useDownloadDir".into(), json!(true));
        prefs.insert(
            "browser.helperApps.neverAsk.saveToDisk".into(),
            json!(SAVE_WITHOUT_ASKING),
        );
    }

    let args: Vec<&str> = if config.headless {
        vec!["-headless"]
    } else {
        Vec::new()
    };
    let mut firefox = json!({ "args": args, "prefs": prefs });
    if let Some(binary) = &config.browser_binary {
        firefox["binary"] = json!(binary.display().to_string());
    }

    let implicit_ms = u64::try_from(config.implicit_wait.as_millis()).unwrap_or(u64::MAX);
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "firefox",
                "timeouts": { "implicit": implicit_ms },
                "moz:firefoxOptions": firefox,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_capabilities_with_downloads() {
        let config = BrowserConfig::default()
            .with_download_dir("/tmp/bolsar-downloads")
            .with_browser_binary("/usr/bin/firefox-esr");
        let caps = capabilities(&config);
        let firefox = &caps["capabilities"]["alwaysMatch"]["moz:firefoxOptions"];

        assert_eq!(firefox["args"], json!(["-headless"]));
        assert_eq!(firefox["binary"], json!("/usr/bin/firefox-esr"));
        assert_eq!(firefox["prefs"]["browser.download.folderList"], json!(2));
        assert_eq!(
            firefox["prefs"]["browser.download.dir"],
            json!("/tmp/bolsar-downloads")
        );
        assert_eq!(
            caps["capabilities"]["alwaysMatch"]["timeouts"]["implicit"],
            json!(10_000)
        );
    }

    #[test]
    fn test_capabilities_headed_without_downloads() {
        let config = BrowserConfig {
            headless: false,
            implicit_wait: Duration::from_secs(3),
            download_dir: None,
            browser_binary: None::<PathBuf>,
            ..Default::default()
        };
        let caps = capabilities(&config);
        let firefox = &caps["capabilities"]["alwaysMatch"]["moz:firefoxOptions"];

        assert_eq!(firefox["args"], json!([]));
        assert!(firefox.get("binary").is_none());
        assert_eq!(firefox["prefs"], json!({}));
    }

    #[test]
    fn test_command_error_mapping() {
        let err = command_error(&json!({"error": "no such element", "message": "#tabla"}));
        assert!(err.is_no_such_element());

        let err = command_error(&json!({"error": "session not created", "message": "no binary"}));
        assert!(matches!(err, BrowserError::SessionNotCreated(_)));

        let err = command_error(&json!({"error": "no such cookie", "message": ""}));
        assert!(matches!(err, BrowserError::WebDriver { ref error, .. } if error == "no such cookie"));
    }

    #[test]
    fn test_element_refs() {
        let found = json!([{ (ELEMENT_KEY): "a-1" }, { (ELEMENT_KEY): "b-2" }]);
        let refs = element_refs(found).unwrap();
        assert_eq!(refs, vec![ElementRef::new("a-1"), ElementRef::new("b-2")]);

        assert!(element_refs(json!([])).unwrap().is_empty());
        assert!(element_refs(json!({"oops": 1})).is_err());
        assert!(element_refs(json!([{ "other": "x" }])).is_err());
    }
}
