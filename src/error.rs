// Client-side error types
use thiserror::Error;

use crate::http::classify::StatusClass;

/// Message used when a JSON response does not carry the `{code, message, data}` envelope
pub const NON_SYSTEM_API: &str = "non-system-api";

/// Message used when an application error arrives without a message of its own
pub const DEFAULT_FAILURE_MESSAGE: &str = "request failed";

/// A classified failure of one backend call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RequestError {
    // Business-rule rejection carried inside a 200 envelope
    #[error("{message}")]
    Application { code: i64, message: String },

    // JSON response without an envelope `code`
    #[error("{}", NON_SYSTEM_API)]
    NonSystemResponse,

    // Envelope code from the session-invalid set
    #[error("unauthorized")]
    AuthExpired,

    // No response, or a non-2xx status
    #[error("{message}")]
    Transport { status: StatusClass, message: String },

    #[error("failed to encode request: {0}")]
    Encode(String),

    #[error("failed to decode response payload: {0}")]
    Decode(String),
}

impl RequestError {
    /// Human-readable message shown to the user
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status associated with the failure, when there is one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RequestError::Transport { status, .. } => status.code(),
            RequestError::AuthExpired => Some(401),
            _ => None,
        }
    }

    /// Stable machine-readable code for scripting
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Application { .. } => "APPLICATION_ERROR",
            RequestError::NonSystemResponse => "NON_SYSTEM_RESPONSE",
            RequestError::AuthExpired => "AUTH_EXPIRED",
            RequestError::Transport { status, .. } => status.error_code(),
            RequestError::Encode(_) => "ENCODE_ERROR",
            RequestError::Decode(_) => "DECODE_ERROR",
        }
    }

    /// True when this failure forces the session to be torn down
    pub fn is_session_terminating(&self) -> bool {
        matches!(
            self,
            RequestError::AuthExpired
                | RequestError::Transport {
                    status: StatusClass::Unauthorized,
                    ..
                }
        )
    }

    /// True when the user can reasonably retry or correct input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RequestError::Application { .. } | RequestError::Transport { .. }
        ) && !self.is_session_terminating()
    }
}

// Static constructors
impl RequestError {
    pub fn application(code: i64, message: impl Into<String>) -> Self {
        RequestError::Application {
            code,
            message: message.into(),
        }
    }

    pub fn transport(status: StatusClass, message: impl Into<String>) -> Self {
        RequestError::Transport {
            status,
            message: message.into(),
        }
    }
}

/// Failures of the durable credential backing
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("credential storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential storage is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a session lifecycle operation that both calls the backend and
/// writes credentials
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("no refresh token in session")]
    MissingRefreshToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_expired_terminates_session() {
        assert!(RequestError::AuthExpired.is_session_terminating());
        assert!(!RequestError::AuthExpired.is_recoverable());
    }

    #[test]
    fn transport_401_terminates_session() {
        let err = RequestError::transport(StatusClass::Unauthorized, "unauthorized");
        assert!(err.is_session_terminating());
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.error_code(), "UNAUTHORIZED");
    }

    #[test]
    fn server_error_is_recoverable() {
        let err = RequestError::transport(StatusClass::ServerError, "internal server error");
        assert!(!err.is_session_terminating());
        assert!(err.is_recoverable());
        assert_eq!(err.message(), "internal server error");
    }

    #[test]
    fn non_system_response_message() {
        assert_eq!(RequestError::NonSystemResponse.message(), NON_SYSTEM_API);
        assert!(!RequestError::NonSystemResponse.is_recoverable());
    }

    #[test]
    fn application_error_carries_backend_message() {
        let err = RequestError::application(3001, "topic_exists");
        assert_eq!(err.message(), "topic_exists");
        assert_eq!(err.status_code(), None);
        assert_eq!(err.error_code(), "APPLICATION_ERROR");
    }
}
