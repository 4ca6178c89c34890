#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use serde_json::{json, Value};
use wiremock::{MockServer, ResponseTemplate};

use ebbing_console::config::ConsoleConfig;
use ebbing_console::notify::Notifier;
use ebbing_console::session::{CredentialStore, MemoryCredentialStore, TokenPair};
use ebbing_console::Console;

/// Notifier that keeps every message for later assertions
#[derive(Default)]
pub struct Notices {
    messages: Mutex<Vec<String>>,
}

impl Notices {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for Notices {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// A mock backend plus a console wired against it
pub struct TestBackend {
    pub server: MockServer,
    pub console: Console,
    pub notices: Arc<Notices>,
}

impl TestBackend {
    pub async fn start() -> Result<Self> {
        Self::start_with(Arc::new(MemoryCredentialStore::new()), 2000).await
    }

    pub async fn start_with(credentials: Arc<dyn CredentialStore>, timeout_ms: u64) -> Result<Self> {
        let server = MockServer::start().await;

        let mut config = ConsoleConfig::development();
        config.api.base_url = format!("{}/api", server.uri());
        config.api.timeout_ms = timeout_ms;

        let notices = Arc::new(Notices::default());
        let console = Console::from_config_with(&config, credentials, notices.clone())?;

        Ok(Self {
            server,
            console,
            notices,
        })
    }

    /// Start with a session already holding `access`/`refresh`
    pub async fn logged_in() -> Result<Self> {
        let backend = Self::start().await?;
        backend
            .console
            .session
            .establish(&TokenPair::new("access-1", "refresh-1"))?;
        Ok(backend)
    }
}

/// Success envelope around `data`
pub fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "code": 0,
        "message": "ok",
        "data": data
    }))
}

/// Envelope carrying an application error code
pub fn fail(status: u16, code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "code": code,
        "message": message,
        "data": null
    }))
}
