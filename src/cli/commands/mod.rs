pub mod auth;
pub mod knowledge;
pub mod nav;
pub mod plans;
pub mod study;

use crate::cli::utils::request_failed;
use crate::cli::OutputFormat;
use crate::error::SessionError;

/// Render a session failure; request failures get the same treatment as
/// any other command's
pub(crate) fn session_failed(output_format: &OutputFormat, err: SessionError) -> anyhow::Error {
    match err {
        SessionError::Request(request) => request_failed(output_format, request),
        other => anyhow::Error::new(other),
    }
}
