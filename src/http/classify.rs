//! Response classification.
//!
//! The backend signals failure on two channels: the HTTP status of the
//! exchange and the `code` field of the `{code, message, data}` envelope it
//! wraps every JSON body in. Business errors usually travel on a 200, so a
//! transport success is necessary but not sufficient for an application
//! success. [`classify`] folds both channels into a single [`Outcome`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RequestError, DEFAULT_FAILURE_MESSAGE, NON_SYSTEM_API};

/// Envelope codes reserved for an invalid or revoked session
pub const SESSION_INVALID_CODES: [i64; 2] = [1002, 2003];

/// Envelope code for success
pub const SUCCESS_CODE: i64 = 0;

/// How the caller expects the response body to be interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    #[default]
    Json,
    Binary,
}

/// A completed HTTP exchange as seen by the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The exchange never produced an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    Timeout,
    Connect(String),
    Other(String),
}

/// HTTP status grouped the way the console reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusClass {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Timeout,
    ServerError,
    Other(Option<u16>),
}

impl StatusClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => StatusClass::BadRequest,
            401 => StatusClass::Unauthorized,
            403 => StatusClass::Forbidden,
            404 => StatusClass::NotFound,
            408 => StatusClass::Timeout,
            500 => StatusClass::ServerError,
            other => StatusClass::Other(Some(other)),
        }
    }

    pub fn code(&self) -> Option<u16> {
        match self {
            StatusClass::BadRequest => Some(400),
            StatusClass::Unauthorized => Some(401),
            StatusClass::Forbidden => Some(403),
            StatusClass::NotFound => Some(404),
            StatusClass::Timeout => Some(408),
            StatusClass::ServerError => Some(500),
            StatusClass::Other(code) => *code,
        }
    }

    /// Fixed message reported for this class
    pub fn fixed_message(&self) -> &'static str {
        match self {
            StatusClass::BadRequest => "bad request",
            StatusClass::Unauthorized => "unauthorized",
            StatusClass::Forbidden => "access denied",
            StatusClass::NotFound => "request address not found",
            StatusClass::Timeout => "request timed out",
            StatusClass::ServerError => "internal server error",
            StatusClass::Other(_) => DEFAULT_FAILURE_MESSAGE,
        }
    }

    /// Whether a backend-supplied message takes precedence over the fixed one
    fn prefers_backend_message(&self) -> bool {
        matches!(
            self,
            StatusClass::BadRequest
                | StatusClass::Unauthorized
                | StatusClass::Forbidden
                | StatusClass::Other(_)
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StatusClass::BadRequest => "BAD_REQUEST",
            StatusClass::Unauthorized => "UNAUTHORIZED",
            StatusClass::Forbidden => "FORBIDDEN",
            StatusClass::NotFound => "NOT_FOUND",
            StatusClass::Timeout => "REQUEST_TIMEOUT",
            StatusClass::ServerError => "INTERNAL_SERVER_ERROR",
            StatusClass::Other(_) => "TRANSPORT_ERROR",
        }
    }
}

/// Envelope rejection. `code` is `None` when the body had no envelope at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationFailure {
    pub code: Option<i64>,
    pub message: String,
}

/// Unwrapped body of a successful call
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Data(Value),
    Binary(Vec<u8>),
}

/// Classified result of one exchange
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    AuthExpired,
    ApplicationError(ApplicationFailure),
    TransportError { status: StatusClass, message: String },
}

impl<T> Outcome<T> {
    /// True for outcomes after which the session must not survive
    pub fn terminates_session(&self) -> bool {
        matches!(
            self,
            Outcome::AuthExpired
                | Outcome::TransportError {
                    status: StatusClass::Unauthorized,
                    ..
                }
        )
    }

    pub fn into_result(self) -> Result<T, RequestError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::AuthExpired => Err(RequestError::AuthExpired),
            Outcome::ApplicationError(ApplicationFailure { code: None, .. }) => {
                Err(RequestError::NonSystemResponse)
            }
            Outcome::ApplicationError(ApplicationFailure {
                code: Some(code),
                message,
            }) => Err(RequestError::Application { code, message }),
            Outcome::TransportError { status, message } => {
                Err(RequestError::Transport { status, message })
            }
        }
    }
}

/// Classify a finished exchange into an [`Outcome`].
///
/// Any non-2xx status is judged on the transport layer, envelope or not;
/// only 2xx responses reach the envelope rules.
pub fn classify(
    exchange: Result<RawResponse, TransportFailure>,
    kind: ResponseKind,
) -> Outcome<Payload> {
    let response = match exchange {
        Ok(response) => response,
        Err(TransportFailure::Timeout) => {
            return transport_error(StatusClass::Timeout, None);
        }
        Err(TransportFailure::Connect(_)) | Err(TransportFailure::Other(_)) => {
            return transport_error(StatusClass::Other(None), None);
        }
    };

    if !response.is_success() {
        let backend_message = serde_json::from_slice::<Value>(&response.body)
            .ok()
            .and_then(|body| non_empty_message(&body));
        return transport_error(StatusClass::from_status(response.status), backend_message);
    }

    if kind == ResponseKind::Binary {
        return Outcome::Success(Payload::Binary(response.body));
    }

    classify_envelope(&response.body)
}

fn classify_envelope(body: &[u8]) -> Outcome<Payload> {
    let envelope = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => return non_system_api(),
    };

    let code = match envelope.get("code").and_then(Value::as_i64) {
        Some(code) => code,
        None => return non_system_api(),
    };

    if code == SUCCESS_CODE {
        let data = envelope.get("data").cloned().unwrap_or(Value::Null);
        return Outcome::Success(Payload::Data(data));
    }

    if SESSION_INVALID_CODES.contains(&code) {
        return Outcome::AuthExpired;
    }

    let message = envelope
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_FAILURE_MESSAGE)
        .to_string();

    Outcome::ApplicationError(ApplicationFailure {
        code: Some(code),
        message,
    })
}

fn non_system_api() -> Outcome<Payload> {
    Outcome::ApplicationError(ApplicationFailure {
        code: None,
        message: NON_SYSTEM_API.to_string(),
    })
}

fn transport_error(status: StatusClass, backend_message: Option<String>) -> Outcome<Payload> {
    let message = match backend_message {
        Some(m) if status.prefers_backend_message() => m,
        _ => status.fixed_message().to_string(),
    };
    Outcome::TransportError { status, message }
}

fn non_empty_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
