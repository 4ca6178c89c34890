pub mod apis;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod http;
pub mod notify;
pub mod router;
pub mod session;

#[cfg(test)]
pub mod testing;

pub use console::Console;
pub use error::{RequestError, SessionError, StorageError};
pub use http::{ApiClient, RequestConfig};
pub use router::{Admission, NavigationGuard, RouteTable};
pub use session::{Session, SessionStore};
