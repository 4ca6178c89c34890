use std::sync::Arc;

use crate::config::ConsoleConfig;
use crate::error::RequestError;
use crate::http::{ApiClient, RequestDefaults, ReqwestTransport};
use crate::notify::{Notifier, TracingNotifier};
use crate::router::{NavigationGuard, RouteTable};
use crate::session::{CredentialStore, SessionSettings, SessionStore};

/// Everything that shares the one session: the store itself, the request
/// pipeline writing through it and the guard reading from it.
#[derive(Clone)]
pub struct Console {
    pub session: Arc<SessionStore>,
    pub client: ApiClient,
    pub guard: NavigationGuard,
}

impl Console {
    /// Wire the console over reqwest with the default route table, reporting
    /// failures through tracing
    pub fn from_config(
        config: &ConsoleConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, RequestError> {
        Self::from_config_with(config, credentials, Arc::new(TracingNotifier))
    }

    pub fn from_config_with(
        config: &ConsoleConfig,
        credentials: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, RequestError> {
        let session = Arc::new(SessionStore::new(
            credentials,
            SessionSettings::from_config(config),
        ));
        let client = ApiClient::new(
            RequestDefaults::from_config(config)?,
            session.clone(),
            Arc::new(ReqwestTransport::new()),
            notifier,
        );
        let table = RouteTable::default_console(&config.routes.landing_path);
        let guard = NavigationGuard::new(Arc::new(table), session.clone());

        Ok(Self {
            session,
            client,
            guard,
        })
    }
}
