//! Thin typed wrappers over the backend endpoints. Each one shapes a URL and
//! payload and hands it to the [`ApiClient`](crate::http::ApiClient); none of
//! them carry logic of their own.

pub mod auth;
pub mod knowledge;
pub mod plans;
pub mod study;
pub mod users;

use serde::{Deserialize, Serialize};

pub use auth::{LoginRequest, LoginResponse, RefreshResponse, RegisterRequest};
pub use users::CurrentUser;

/// `{items, total}` listing used by most collection endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: u64,
}
