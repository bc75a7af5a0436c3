//! WebDriver process management.

use reqwest::Client;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::debug;

use crate::BrowserError;

/// Delay between readiness probes.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A WebDriver process owned by one browser session.
///
/// The process is killed when this value is dropped.
#[derive(Debug)]
pub(crate) struct DriverProcess {
    _child: Child,
    port: u16,
}

impl DriverProcess {
    /// Spawns the WebDriver executable listening on `port`.
    ///
    /// Driver output is discarded.
    pub(crate) fn spawn(executable: &Path, port: u16) -> Result<Self, BrowserError> {
        let child = Command::new(executable)
            .args(["--port", &port.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BrowserError::SpawnDriver {
                executable: PathBuf::from(executable),
                source: e,
            })?;

        debug!(executable = %executable.display(), port, "spawned webdriver");
        Ok(Self {
            _child: child,
            port,
        })
    }

    /// Returns the base URL of the driver's HTTP endpoint.
    pub(crate) fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Polls the driver's `/status` endpoint until it reports ready.
    pub(crate) async fn wait_until_ready(
        &self,
        http: &Client,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        let status_url = format!("{}/status", self.url());

        loop {
            match http.get(&status_url).send().await {
                Ok(response) => {
                    if let Ok(status) = response.json::<Value>().await
                        && is_ready(&status)
                    {
                        return Ok(());
                    }
                }
                Err(e) => debug!(error = %e, "webdriver not reachable yet"),
            }

            if Instant::now() >= deadline {
                return Err(BrowserError::DriverTimeout(timeout));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

/// Returns true if a `/status` payload reports the driver ready.
fn is_ready(status: &Value) -> bool {
    status
        .get("value")
        .and_then(|value| value.get("ready"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
