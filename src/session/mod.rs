pub mod credentials;
pub mod store;
pub mod views;

pub use credentials::{CredentialKind, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use store::{Session, SessionSettings, SessionStore, TokenPair};
pub use views::{ViewCache, VisitedView};
