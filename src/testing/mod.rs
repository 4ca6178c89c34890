use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::http::classify::{RawResponse, TransportFailure};
use crate::http::transport::{PreparedRequest, Transport};
use crate::notify::Notifier;

/// Notifier that keeps every error message it was handed
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Transport that answers from a queue and records what it was sent
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse, TransportFailure>>>,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<RawResponse, TransportFailure>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(Ok(RawResponse::json(status, &body)));
    }

    pub fn push_failure(&self, failure: TransportFailure) {
        self.push(Err(failure));
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportFailure::Other("no scripted response".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use std::time::Duration;

    #[tokio::test]
    async fn scripted_transport_replays_in_order() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, serde_json::json!({"code": 0}));
        let request = PreparedRequest {
            method: Method::GET,
            url: url::Url::parse("http://backend.test/api/plans").unwrap(),
            headers: Vec::new(),
            body: None,
            timeout: Duration::from_secs(1),
        };

        assert_eq!(transport.execute(request.clone()).await.unwrap().status, 200);
        assert!(transport.execute(request).await.is_err());
        assert_eq!(transport.requests().len(), 2);
    }
}
