//! Instrument metadata retrieval with bounded session recreation.

use bolsar_browser::Browser;
use bolsar_types::InstrumentRecord;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::session::{MetadataTransport, SessionFactory};
use crate::{MetadataConfig, MetadataError};

/// Record field set from the instrument endpoint's `emisor`.
pub const ISSUER_NAME_FIELD: &str = "nombre";

/// Retry progress for one instrument.
///
/// `Fresh -> (Succeeded | Failed -> Retrying -> (Succeeded | FatalFailed))`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// First attempt on the current session.
    Fresh,
    /// The first attempt hit a connection-level failure.
    Failed,
    /// Second attempt on a recreated session.
    Retrying,
    /// The instrument's queries succeeded.
    Succeeded,
    /// The failure is final and propagates.
    FatalFailed,
}

impl RetryState {
    /// Returns the state after `result`.
    #[must_use]
    pub const fn after(self, result: &Result<InstrumentRecord, MetadataError>) -> Self {
        match (self, result) {
            (_, Ok(_)) => Self::Succeeded,
            (Self::Fresh, Err(e)) if e.is_transport() => Self::Failed,
            _ => Self::FatalFailed,
        }
    }
}

/// Records gathered by one metadata run.
#[derive(Debug, Clone, Default)]
pub struct MetadataReport {
    /// One record per requested symbol, in request order.
    pub records: Vec<InstrumentRecord>,
    /// Number of times the session was replaced after a transport failure.
    pub session_recreations: usize,
}

/// Opens the portal in the browser and reads the session cookie it sets.
///
/// # Errors
///
/// Returns an error if navigation fails or the cookie is absent.
pub async fn obtain_cookie<B: Browser + ?Sized>(
    browser: &B,
    config: &MetadataConfig,
) -> Result<String, MetadataError> {
    browser.navigate(&config.dashboard_url).await?;
    browser.navigate(&config.cookie_bootstrap_url).await?;

    let cookie = browser
        .cookie(&config.cookie_name)
        .await?
        .ok_or_else(|| MetadataError::MissingCookie(config.cookie_name.clone()))?;
    debug!(name = %config.cookie_name, "obtained session cookie");
    Ok(cookie)
}

/// Returns the first element of the answer's `data` array, if any.
fn first_data(endpoint: &str, answer: Value) -> Result<Option<Value>, MetadataError> {
    let Value::Object(mut object) = answer else {
        return Err(MetadataError::Decode {
            endpoint: endpoint.to_string(),
            reason: "answer is not a JSON object".to_string(),
        });
    };
    match object.remove("data") {
        Some(Value::Array(items)) => Ok(items.into_iter().next()),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(MetadataError::Decode {
            endpoint: endpoint.to_string(),
            reason: "'data' is not an array".to_string(),
        }),
    }
}

/// Queries both endpoints for `symbol` and merges what they return.
///
/// An empty `data` array leaves its field group out of the record.
///
/// # Errors
///
/// Returns the first query or decoding failure.
pub async fn fetch_record<T: MetadataTransport + ?Sized>(
    transport: &T,
    config: &MetadataConfig,
    symbol: &str,
) -> Result<InstrumentRecord, MetadataError> {
    let body = json!({ "symbol": symbol, "Content-Type": "application/json" });

    let company = transport.post_json(&config.company_endpoint, &body).await?;
    let company = first_data(&config.company_endpoint, company)?;
    let species = transport.post_json(&config.species_endpoint, &body).await?;
    let species = first_data(&config.species_endpoint, species)?;

    let mut record = InstrumentRecord::new(symbol);
    if let Some(issuer) = species.as_ref().and_then(|s| s.get("emisor")) {
        record.insert(ISSUER_NAME_FIELD, issuer.clone());
    }
    if let Some(company) = company {
        record.merge(company);
    }

    if record.is_bare() {
        debug!(symbol, "no metadata returned");
    }
    Ok(record)
}

/// Fetches instrument metadata one symbol at a time over a recreatable
/// session.
#[derive(Debug)]
pub struct MetadataFetcher<F> {
    factory: F,
    config: MetadataConfig,
}

impl<F: SessionFactory> MetadataFetcher<F> {
    /// Creates a fetcher.
    #[must_use]
    pub const fn new(factory: F, config: MetadataConfig) -> Self {
        Self { factory, config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &MetadataConfig {
        &self.config
    }

    /// Fetches a record for every symbol, in order.
    ///
    /// A connection-level failure closes the session, opens a new one with
    /// the same cookie and retries that symbol once. The session is closed
    /// when the run ends, whether it succeeded or not.
    ///
    /// # Errors
    ///
    /// Returns an error if a session cannot be created, a symbol fails twice
    /// in a row with a transport error, or any other failure occurs.
    pub async fn fetch_all(
        &self,
        cookie: &str,
        symbols: &[String],
    ) -> Result<MetadataReport, MetadataError> {
        let mut session = self.factory.create(cookie).await?;
        let mut report = MetadataReport::default();

        for symbol in symbols {
            let mut state = RetryState::Fresh;
            let outcome = loop {
                let result = fetch_record(&session, &self.config, symbol).await;
                state = state.after(&result);
                match state {
                    RetryState::Failed => {
                        if let Err(e) = &result {
                            warn!(symbol = %symbol, error = %e, "transport failure, recreating session");
                        }
                        session.close().await;
                        session = match self.factory.create(cookie).await {
                            Ok(fresh) => fresh,
                            Err(e) => return Err(e),
                        };
                        report.session_recreations += 1;
                        state = RetryState::Retrying;
                    }
                    _ => break result,
                }
            };

            match outcome {
                Ok(record) => {
                    debug!(symbol = %symbol, ?state, fields = record.fields().len(), "fetched metadata");
                    report.records.push(record);
                }
                Err(e) => {
                    session.close().await;
                    return Err(e);
                }
            }
        }

        session.close().await;
        info!(
            instruments = report.records.len(),
            recreations = report.session_recreations,
            "metadata run finished"
        );
        Ok(report)
    }

    /// Obtains the session cookie through `browser`, then fetches every
    /// symbol.
    ///
    /// # Errors
    ///
    /// See [`obtain_cookie`] and [`MetadataFetcher::fetch_all`].
    pub async fn fetch_with_browser<B: Browser + ?Sized>(
        &self,
        browser: &B,
        symbols: &[String],
    ) -> Result<MetadataReport, MetadataError> {
        let cookie = obtain_cookie(browser, &self.config).await?;
        self.fetch_all(&cookie, symbols).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bolsar_browser::fake::FakeBrowser;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Scripted answer for one POST.
    #[derive(Clone)]
    enum Reply {
        Data(Value),
        Reset,
        Unavailable,
    }

    #[derive(Default)]
    struct Script {
        replies: Mutex<VecDeque<Reply>>,
        sessions_created: AtomicUsize,
        sessions_closed: AtomicUsize,
        cookies: Mutex<Vec<String>>,
        posts: Mutex<Vec<(String, Value)>>,
    }

    struct FakeTransport {
        script: Arc<Script>,
    }

    #[async_trait]
    impl MetadataTransport for FakeTransport {
        async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value, MetadataError> {
            self.script
                .posts
                .lock()
                .unwrap()
                .push((endpoint.to_string(), body.clone()));
            match self.script.replies.lock().unwrap().pop_front() {
                Some(Reply::Data(value)) => Ok(value),
                Some(Reply::Reset) => Err(MetadataError::Transport("connection reset".into())),
                Some(Reply::Unavailable) | None => Err(MetadataError::Status {
                    endpoint: endpoint.to_string(),
                    status: 503,
                }),
            }
        }

        async fn close(self) {
            self.script.sessions_closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeFactory {
        script: Arc<Script>,
    }

    #[async_trait]
    impl SessionFactory for FakeFactory {
        type Transport = FakeTransport;

        async fn create(&self, cookie: &str) -> Result<FakeTransport, MetadataError> {
            self.script.sessions_created.fetch_add(1, Ordering::SeqCst);
            self.script.cookies.lock().unwrap().push(cookie.to_string());
            Ok(FakeTransport {
                script: Arc::clone(&self.script),
            })
        }
    }

    fn fetcher(replies: Vec<Reply>) -> (MetadataFetcher<FakeFactory>, Arc<Script>) {
        let script = Arc::new(Script::default());
        *script.replies.lock().unwrap() = replies.into();
        let factory = FakeFactory {
            script: Arc::clone(&script),
        };
        (
            MetadataFetcher::new(factory, MetadataConfig::default()),
            script,
        )
    }

    fn company(sector: &str) -> Reply {
        Reply::Data(json!({ "data": [{ "sector": sector, "moneda": "ARS" }] }))
    }

    fn species(issuer: &str) -> Reply {
        Reply::Data(json!({ "data": [{ "emisor": issuer }] }))
    }

    fn empty() -> Reply {
        Reply::Data(json!({ "data": [] }))
    }

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn test_records_merge_both_queries() {
        let (fetcher, script) = fetcher(vec![company("Bancos"), species("GRUPO FINANCIERO GALICIA")]);

        let report = fetcher.fetch_all("abc", &symbols(&["GGAL"])).await.unwrap();

        let record = &report.records[0];
        assert_eq!(record.symbol(), "GGAL");
        assert_eq!(record.get("nombre"), Some(&json!("GRUPO FINANCIERO GALICIA")));
        assert_eq!(record.get("sector"), Some(&json!("Bancos")));
        assert_eq!(report.session_recreations, 0);

        let posts = script.posts.lock().unwrap();
        assert_eq!(posts[0].0, fetcher.config().company_endpoint);
        assert_eq!(posts[1].0, fetcher.config().species_endpoint);
        assert_eq!(
            posts[0].1,
            json!({ "symbol": "GGAL", "Content-Type": "application/json" })
        );
    }

    #[tokio::test]
    async fn test_empty_data_is_partial_record() {
        let (fetcher, _) = fetcher(vec![empty(), species("YPF S.A.")]);

        let report = fetcher.fetch_all("abc", &symbols(&["YPFD"])).await.unwrap();

        let record = &report.records[0];
        assert_eq!(record.get("nombre"), Some(&json!("YPF S.A.")));
        assert_eq!(record.fields().len(), 2);
    }

    #[tokio::test]
    async fn test_no_data_leaves_bare_record() {
        let (fetcher, _) = fetcher(vec![empty(), empty()]);
        let report = fetcher.fetch_all("abc", &symbols(&["XXXX"])).await.unwrap();
        assert!(report.records[0].is_bare());
    }

    #[tokio::test]
    async fn test_transport_failure_retried_once_on_fresh_session() {
        let (fetcher, script) = fetcher(vec![
            Reply::Reset,
            company("Energia"),
            species("YPF S.A."),
        ]);

        let report = fetcher.fetch_all("abc", &symbols(&["YPFD"])).await.unwrap();

        assert_eq!(report.session_recreations, 1);
        assert_eq!(report.records[0].get("sector"), Some(&json!("Energia")));
        assert_eq!(script.sessions_created.load(Ordering::SeqCst), 2);
        assert_eq!(script.sessions_closed.load(Ordering::SeqCst), 2);
        assert_eq!(*script.cookies.lock().unwrap(), vec!["abc", "abc"]);
    }

    #[tokio::test]
    async fn test_second_transport_failure_propagates() {
        let (fetcher, script) = fetcher(vec![Reply::Reset, Reply::Reset, company("unused")]);

        let err = fetcher
            .fetch_all("abc", &symbols(&["YPFD", "GGAL"]))
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert_eq!(script.sessions_created.load(Ordering::SeqCst), 2);
        assert_eq!(script.sessions_closed.load(Ordering::SeqCst), 2);
        assert_eq!(script.posts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_non_transport_failure_not_retried() {
        let (fetcher, script) = fetcher(vec![Reply::Unavailable]);

        let err = fetcher.fetch_all("abc", &symbols(&["YPFD"])).await.unwrap_err();

        assert!(matches!(err, MetadataError::Status { status: 503, .. }));
        assert_eq!(script.sessions_created.load(Ordering::SeqCst), 1);
        assert_eq!(script.sessions_closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_budget_is_per_instrument() {
        let (fetcher, script) = fetcher(vec![
            Reply::Reset,
            company("Bancos"),
            species("GALICIA"),
            Reply::Reset,
            company("Energia"),
            species("YPF S.A."),
        ]);

        let report = fetcher
            .fetch_all("abc", &symbols(&["GGAL", "YPFD"]))
            .await
            .unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.session_recreations, 2);
        assert_eq!(script.sessions_closed.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_with_browser_reads_cookie() {
        let (fetcher, script) = fetcher(vec![empty(), empty()]);
        let browser = FakeBrowser::new().with_cookie("JSESSIONID", "from-browser");

        fetcher
            .fetch_with_browser(&browser, &symbols(&["GGAL"]))
            .await
            .unwrap();

        assert_eq!(
            browser.navigations(),
            vec![
                fetcher.config().dashboard_url.clone(),
                fetcher.config().cookie_bootstrap_url.clone(),
            ]
        );
        assert_eq!(*script.cookies.lock().unwrap(), vec!["from-browser"]);
    }

    #[tokio::test]
    async fn test_missing_cookie() {
        let browser = FakeBrowser::new();
        let err = obtain_cookie(&browser, &MetadataConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::MissingCookie(name) if name == "JSESSIONID"));
    }

    #[test]
    fn test_retry_state_transitions() {
        let transport: Result<InstrumentRecord, MetadataError> =
            Err(MetadataError::Transport("reset".into()));
        let ok: Result<InstrumentRecord, MetadataError> = Ok(InstrumentRecord::new("GGAL"));

        assert_eq!(RetryState::Fresh.after(&transport), RetryState::Failed);
        assert_eq!(RetryState::Retrying.after(&transport), RetryState::FatalFailed);
        assert_eq!(RetryState::Fresh.after(&ok), RetryState::Succeeded);
        assert_eq!(RetryState::Retrying.after(&ok), RetryState::Succeeded);
    }

    #[test]
    fn test_first_data_rejects_non_array() {
        let err = first_data("e", json!({ "data": "nope" })).unwrap_err();
        assert!(matches!(err, MetadataError::Decode { .. }));
        assert_eq!(first_data("e", json!({})).unwrap(), None);
    }
}
