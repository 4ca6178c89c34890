//! Session store: the only writer of the authenticated-user context.
//!
//! One [`SessionStore`] is shared (behind an `Arc`) by the request pipeline
//! and the navigation guard. Every mutation is synchronous and visible to the
//! next read. Clearing an already-empty session is a no-op, which is what
//! makes concurrent forced logouts safe.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::apis::{self, CurrentUser, LoginRequest, LoginResponse};
use crate::config::ConsoleConfig;
use crate::error::{SessionError, StorageError};
use crate::http::ApiClient;
use crate::session::credentials::{CredentialKind, CredentialStore};
use crate::session::views::{ViewCache, VisitedView};

/// Access/refresh token pair as issued by the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

/// The authenticated (or anonymous) user context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: String,
    pub roles: BTreeSet<String>,
    pub display_name: String,
    pub email: String,
}

impl Session {
    pub fn is_anonymous(&self) -> bool {
        self.access_token.is_empty()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.is_anonymous()
    }

    pub fn has_any_role(&self, required: &BTreeSet<String>) -> bool {
        required.iter().any(|role| self.roles.contains(role))
    }
}

/// Knobs the store is constructed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Roles assumed when the backend reports none
    pub default_roles: BTreeSet<String>,
    /// Keep visited/cached views across logout
    pub keep_view_cache: bool,
    pub current_user_path: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_roles: BTreeSet::from(["user".to_string()]),
            keep_view_cache: false,
            current_user_path: "/user/profile".to_string(),
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self {
            default_roles: config.session.default_roles.iter().cloned().collect(),
            keep_view_cache: config.session.keep_view_cache,
            current_user_path: config.api.current_user_path.clone(),
        }
    }
}

pub struct SessionStore {
    credentials: Arc<dyn CredentialStore>,
    settings: SessionSettings,
    state: RwLock<Session>,
    views: RwLock<ViewCache>,
    teardown: watch::Sender<u64>,
}

impl SessionStore {
    /// Create the store, hydrating tokens from the credential backing
    pub fn new(credentials: Arc<dyn CredentialStore>, settings: SessionSettings) -> Self {
        let session = Session {
            access_token: credentials.get(CredentialKind::Access).unwrap_or_default(),
            refresh_token: credentials.get(CredentialKind::Refresh).unwrap_or_default(),
            ..Session::default()
        };
        let (teardown, _) = watch::channel(0);

        Self {
            credentials,
            settings,
            state: RwLock::new(session),
            views: RwLock::new(ViewCache::new()),
            teardown,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> Session {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated()
    }

    /// Current access token; `None` rather than an empty string
    pub fn access_token(&self) -> Option<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Some(state.access_token.clone()).filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Some(state.refresh_token.clone()).filter(|t| !t.is_empty())
    }

    /// Persist both tokens and replace the in-memory session with them.
    /// Identity and roles start empty until the next `get_info`.
    pub fn establish(&self, tokens: &TokenPair) -> Result<(), StorageError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        self.credentials.set(CredentialKind::Access, &tokens.access)?;
        self.credentials.set(CredentialKind::Refresh, &tokens.refresh)?;

        *state = Session {
            access_token: tokens.access.clone(),
            refresh_token: tokens.refresh.clone(),
            ..Session::default()
        };
        info!("Session established");
        Ok(())
    }

    /// Authenticate against the backend and establish the returned tokens
    pub async fn login(
        &self,
        client: &ApiClient,
        request: &LoginRequest,
    ) -> Result<LoginResponse, SessionError> {
        let response = apis::auth::login(client, request).await?;
        self.establish(&response.tokens)?;
        Ok(response)
    }

    /// Fetch the current user and overwrite identity and roles
    pub async fn get_info(&self, client: &ApiClient) -> Result<Session, SessionError> {
        let user = apis::users::current_user(client, &self.settings.current_user_path).await?;
        Ok(self.apply_user(&user))
    }

    /// Overwrite identity fields from a current-user payload. An empty role
    /// list falls back to the configured defaults; roles are never applied
    /// to an anonymous session.
    pub fn apply_user(&self, user: &CurrentUser) -> Session {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.email = user.email.clone();
        state.display_name = user.nickname.clone();
        state.roles = if state.is_anonymous() {
            BTreeSet::new()
        } else if user.roles.is_empty() {
            self.settings.default_roles.clone()
        } else {
            user.roles.iter().cloned().collect()
        };
        state.clone()
    }

    /// Exchange the refresh token for a new access token
    pub async fn refresh_access(&self, client: &ApiClient) -> Result<(), SessionError> {
        let refresh = self
            .refresh_token()
            .ok_or(SessionError::MissingRefreshToken)?;
        let renewed = apis::auth::refresh(client, &refresh).await?;

        // The session may have been cleared or replaced while the call was out
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.refresh_token != refresh {
            warn!("Session changed during token refresh; renewed token dropped");
            return Ok(());
        }
        self.credentials
            .set(CredentialKind::Access, &renewed.access)?;
        state.access_token = renewed.access;
        info!("Access token refreshed");
        Ok(())
    }

    /// Revoke the tokens server-side, then terminate locally regardless
    pub async fn sign_out(&self, client: &ApiClient) -> bool {
        if self.is_authenticated() {
            if let Err(e) = apis::auth::logout(client).await {
                warn!("Server-side logout failed: {}", e);
            }
        }
        self.terminate()
    }

    /// Clear tokens and identity, and the navigation cache unless configured
    /// to keep it. Returns whether there was a session to clear.
    pub fn terminate(&self) -> bool {
        let cleared = self.reset();
        if !self.settings.keep_view_cache {
            let mut views = self.views.write().unwrap_or_else(PoisonError::into_inner);
            views.del_all_visited();
            views.del_all_cached();
        }
        cleared
    }

    /// Clear tokens and identity, leaving the navigation cache alone.
    /// Returns whether there was a session to clear.
    pub fn reset(&self) -> bool {
        let cleared = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let had_tokens = !state.access_token.is_empty() || !state.refresh_token.is_empty();
            *state = Session::default();
            for kind in CredentialKind::ALL {
                if let Err(e) = self.credentials.remove(kind) {
                    warn!("Failed to remove {:?} token from storage: {}", kind, e);
                }
            }
            had_tokens
        };

        if cleared {
            info!("Session cleared");
        }
        cleared
    }

    /// Ask dependents to rebuild their in-memory state from the now-empty
    /// session
    pub fn signal_teardown(&self) {
        self.teardown.send_modify(|generation| *generation += 1);
    }

    pub fn subscribe_teardown(&self) -> watch::Receiver<u64> {
        self.teardown.subscribe()
    }

    pub fn teardown_generation(&self) -> u64 {
        *self.teardown.borrow()
    }

    pub fn record_view(&self, view: VisitedView, cache_name: Option<&str>) {
        let mut views = self.views.write().unwrap_or_else(PoisonError::into_inner);
        views.add_visited(view);
        if let Some(name) = cache_name {
            views.add_cached(name);
        }
    }

    pub fn views(&self) -> ViewCache {
        self.views.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
