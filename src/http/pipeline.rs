//! The request pipeline: the single chokepoint every backend call flows
//! through.
//!
//! Caller configuration is merged over [`RequestDefaults`], the bearer token
//! is attached from the session, the exchange is dispatched through a
//! [`Transport`] and the result classified. Session-terminating outcomes
//! clear the session and signal a teardown; every other failure is reported
//! through the [`Notifier`] before the call rejects.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ConsoleConfig;
use crate::error::RequestError;
use crate::http::classify::{classify, Payload, ResponseKind};
use crate::http::transport::{PreparedRequest, Transport};
use crate::notify::Notifier;
use crate::session::SessionStore;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Transport configuration applied to every call unless overridden
#[derive(Debug, Clone)]
pub struct RequestDefaults {
    pub base_url: Url,
    pub timeout: Duration,
    pub content_type: String,
}

impl RequestDefaults {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_millis(8000),
            content_type: JSON_CONTENT_TYPE.to_string(),
        }
    }

    pub fn from_config(config: &ConsoleConfig) -> Result<Self, RequestError> {
        let base_url = Url::parse(&config.api.base_url)
            .map_err(|e| RequestError::Encode(format!("invalid base url: {}", e)))?;
        Ok(Self {
            base_url,
            timeout: Duration::from_millis(config.api.timeout_ms),
            content_type: JSON_CONTENT_TYPE.to_string(),
        })
    }
}

/// Per-call configuration. Anything left unset falls back to the defaults.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub response_kind: ResponseKind,
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            response_kind: ResponseKind::Json,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, RequestError> {
        let value =
            serde_json::to_value(body).map_err(|e| RequestError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds a query pair only when a value is present
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Authenticate this call with an explicit token instead of the session's
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn binary(mut self) -> Self {
        self.response_kind = ResponseKind::Binary;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

struct ClientInner {
    defaults: RequestDefaults,
    session: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
}

/// Cloneable handle onto the request pipeline
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    pub fn new(
        defaults: RequestDefaults,
        session: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                defaults,
                session,
                transport,
                notifier,
            }),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.inner.session
    }

    pub fn defaults(&self) -> &RequestDefaults {
        &self.inner.defaults
    }

    /// Send a JSON call and decode the envelope's `data` into `T`
    pub async fn send<T: DeserializeOwned>(&self, config: RequestConfig) -> Result<T, RequestError> {
        let mut config = config;
        config.response_kind = ResponseKind::Json;

        match self.dispatch(config).await? {
            Payload::Data(data) => serde_json::from_value(data).map_err(|e| {
                let err = RequestError::Decode(e.to_string());
                self.report(&err);
                err
            }),
            Payload::Binary(_) => Err(RequestError::Decode(
                "binary payload on a json call".to_string(),
            )),
        }
    }

    /// Send a call whose body is returned raw, bypassing the envelope
    pub async fn send_bytes(&self, config: RequestConfig) -> Result<Vec<u8>, RequestError> {
        match self.dispatch(config.binary()).await? {
            Payload::Binary(bytes) => Ok(bytes),
            Payload::Data(data) => Ok(data.to_string().into_bytes()),
        }
    }

    async fn dispatch(&self, config: RequestConfig) -> Result<Payload, RequestError> {
        let kind = config.response_kind;
        let request = self.prepare(config)?;
        debug!("{} {}", request.method, request.url);

        let exchange = self.inner.transport.execute(request).await;
        let outcome = classify(exchange, kind);

        if outcome.terminates_session() {
            let err = outcome.into_result().err().unwrap_or(RequestError::AuthExpired);
            warn!("Session rejected by backend: {}", err);
            if self.terminate_session() && err != RequestError::AuthExpired {
                self.inner.notifier.error(&err.message());
            }
            return Err(err);
        }

        outcome.into_result().map_err(|err| {
            self.report(&err);
            err
        })
    }

    fn report(&self, err: &RequestError) {
        warn!("Request failed [{}]: {}", err.error_code(), err);
        self.inner.notifier.error(&err.message());
    }

    /// Only the call that actually cleared the session signals teardown
    fn terminate_session(&self) -> bool {
        let cleared = self.inner.session.terminate();
        if cleared {
            self.inner.session.signal_teardown();
        }
        cleared
    }

    fn prepare(&self, config: RequestConfig) -> Result<PreparedRequest, RequestError> {
        let defaults = &self.inner.defaults;
        let mut url = join_url(&defaults.base_url, &config.path)?;
        if !config.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &config.query {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = vec![("Content-Type".to_string(), defaults.content_type.clone())];
        if let Some(token) = self.inner.session.access_token() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        for (name, value) in config.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        let body = match &config.body {
            Some(value) => Some(
                serde_json::to_vec(value).map_err(|e| RequestError::Encode(e.to_string()))?,
            ),
            None => None,
        };

        Ok(PreparedRequest {
            method: config.method,
            url,
            headers,
            body,
            timeout: config.timeout.unwrap_or(defaults.timeout),
        })
    }
}

/// Append `path` to the base address the way a base URL prefix is expected
/// to behave: `http://host/api` + `/topics` is `http://host/api/topics`.
fn join_url(base: &Url, path: &str) -> Result<Url, RequestError> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Url::parse(path).map_err(|e| RequestError::Encode(e.to_string()));
    }
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| RequestError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::classify::{RawResponse, StatusClass, TransportFailure};
    use crate::session::{MemoryCredentialStore, SessionSettings, TokenPair};
    use crate::testing::{RecordingNotifier, ScriptedTransport};
    use serde_json::json;

    struct Harness {
        client: ApiClient,
        session: Arc<SessionStore>,
        transport: Arc<ScriptedTransport>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness(logged_in: bool) -> Harness {
        let session = Arc::new(SessionStore::new(
            Arc::new(MemoryCredentialStore::new()),
            SessionSettings::default(),
        ));
        if logged_in {
            session
                .establish(&TokenPair::new("access-1", "refresh-1"))
                .unwrap();
        }
        let transport = Arc::new(ScriptedTransport::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let client = ApiClient::new(
            RequestDefaults::new(Url::parse("http://backend.test/api").unwrap()),
            session.clone(),
            transport.clone(),
            notifier.clone(),
        );
        Harness {
            client,
            session,
            transport,
            notifier,
        }
    }

    #[tokio::test]
    async fn success_resolves_with_data_and_stays_quiet() {
        let h = harness(true);
        h.transport
            .push_json(200, json!({"code": 0, "message": "ok", "data": {"total": 3}}));

        let data: Value = h.client.send(RequestConfig::get("/knowledge/topics")).await.unwrap();

        assert_eq!(data, json!({"total": 3}));
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn attaches_bearer_token_when_present() {
        let h = harness(true);
        h.transport.push_json(200, json!({"code": 0, "data": null}));

        let _: Value = h.client.send(RequestConfig::get("/user/profile")).await.unwrap();

        let sent = h.transport.requests();
        assert_eq!(sent[0].header("authorization"), Some("Bearer access-1"));
        assert_eq!(sent[0].header("content-type"), Some(JSON_CONTENT_TYPE));
        assert_eq!(sent[0].url.as_str(), "http://backend.test/api/user/profile");
        assert_eq!(sent[0].timeout, Duration::from_millis(8000));
    }

    #[tokio::test]
    async fn omits_authorization_when_anonymous() {
        let h = harness(false);
        h.transport.push_json(200, json!({"code": 0, "data": {}}));

        let _: Value = h.client.send(RequestConfig::post("/auth/login")).await.unwrap();

        assert_eq!(h.transport.requests()[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn caller_headers_override_defaults() {
        let h = harness(true);
        h.transport.push_json(200, json!({"code": 0, "data": {"access": "a2"}}));

        let _: Value = h
            .client
            .send(RequestConfig::post("/auth/refresh").bearer("refresh-1"))
            .await
            .unwrap();

        let sent = h.transport.requests();
        let auth: Vec<_> = sent[0]
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .collect();
        assert_eq!(auth.len(), 1);
        assert_eq!(sent[0].header("authorization"), Some("Bearer refresh-1"));
    }

    #[tokio::test]
    async fn query_pairs_are_encoded() {
        let h = harness(true);
        h.transport.push_json(200, json!({"code": 0, "data": {}}));

        let _: Value = h
            .client
            .send(
                RequestConfig::get("/knowledge/entries")
                    .query("keyword", "rust lifetimes")
                    .query_opt::<u32>("page", None)
                    .query_opt("page_size", Some(20)),
            )
            .await
            .unwrap();

        assert_eq!(
            h.transport.requests()[0].url.query(),
            Some("keyword=rust+lifetimes&page_size=20")
        );
    }

    #[tokio::test]
    async fn session_invalid_code_terminates_once_and_rejects() {
        let h = harness(true);
        let mut teardown = h.session.subscribe_teardown();
        h.transport
            .push_json(200, json!({"code": 2003, "message": "token_revoked"}));

        let err = h
            .client
            .send::<Value>(RequestConfig::get("/plans"))
            .await
            .unwrap_err();

        assert_eq!(err, RequestError::AuthExpired);
        assert!(h.session.snapshot().is_anonymous());
        assert!(h.session.snapshot().roles.is_empty());
        assert!(teardown.has_changed().unwrap());
        assert_eq!(*teardown.borrow_and_update(), 1);
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn unauthorized_status_terminates_and_notifies() {
        let h = harness(true);
        h.transport.push_json(
            401,
            json!({"code": 1004, "message": "token_expired", "data": null}),
        );

        let err = h
            .client
            .send::<Value>(RequestConfig::get("/plans"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            RequestError::transport(StatusClass::Unauthorized, "token_expired")
        );
        assert!(h.session.snapshot().is_anonymous());
        assert_eq!(h.session.teardown_generation(), 1);
        assert_eq!(h.notifier.messages(), vec!["token_expired".to_string()]);
    }

    #[tokio::test]
    async fn concurrent_auth_failures_tear_down_once() {
        let h = harness(true);
        for _ in 0..4 {
            h.transport.push_json(401, json!({"code": 1002, "message": "invalid_token"}));
        }

        let calls = (0..4).map(|_| h.client.send::<Value>(RequestConfig::get("/plans")));
        let results = futures::future::join_all(calls).await;

        assert!(results.iter().all(|r| r.as_ref().unwrap_err().is_session_terminating()));
        assert_eq!(h.session.teardown_generation(), 1);
        assert_eq!(h.notifier.messages(), vec!["invalid_token".to_string()]);
    }

    #[tokio::test]
    async fn missing_code_rejects_without_touching_session() {
        let h = harness(true);
        h.transport.push_json(200, json!({"items": []}));

        let err = h
            .client
            .send::<Value>(RequestConfig::get("/elsewhere"))
            .await
            .unwrap_err();

        assert_eq!(err.message(), "non-system-api");
        assert_eq!(h.session.access_token().as_deref(), Some("access-1"));
        assert_eq!(h.session.teardown_generation(), 0);
        assert_eq!(h.notifier.messages(), vec!["non-system-api".to_string()]);
    }

    #[tokio::test]
    async fn application_error_is_notified() {
        let h = harness(true);
        h.transport
            .push_json(200, json!({"code": 3002, "message": "plan_not_found"}));

        let err = h
            .client
            .send::<Value>(RequestConfig::get("/plans/9"))
            .await
            .unwrap_err();

        assert_eq!(err, RequestError::application(3002, "plan_not_found"));
        assert_eq!(h.notifier.messages(), vec!["plan_not_found".to_string()]);
        assert!(h.session.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn timeout_surfaces_as_transport_error() {
        let h = harness(true);
        h.transport.push_failure(TransportFailure::Timeout);

        let err = h
            .client
            .send::<Value>(RequestConfig::get("/plans"))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(408));
        assert!(h.session.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn binary_calls_return_raw_bytes() {
        let h = harness(true);
        h.transport.push(Ok(RawResponse::new(200, b"PK\x03\x04".to_vec())));

        let bytes = h
            .client
            .send_bytes(RequestConfig::get("/exports/plans.zip"))
            .await
            .unwrap();

        assert_eq!(bytes, b"PK\x03\x04".to_vec());
    }

    #[tokio::test]
    async fn undecodable_data_is_reported() {
        let h = harness(true);
        h.transport.push_json(200, json!({"code": 0, "data": "not-a-number"}));

        let err = h
            .client
            .send::<u64>(RequestConfig::get("/plans/count"))
            .await
            .unwrap_err();

        assert!(matches!(err, RequestError::Decode(_)));
        assert_eq!(h.notifier.messages().len(), 1);
    }

    #[test]
    fn join_url_keeps_base_prefix() {
        let base = Url::parse("http://localhost:8000/api/").unwrap();
        assert_eq!(
            join_url(&base, "/knowledge/topics").unwrap().as_str(),
            "http://localhost:8000/api/knowledge/topics"
        );
        assert_eq!(
            join_url(&base, "https://other.test/x").unwrap().as_str(),
            "https://other.test/x"
        );
    }
}
