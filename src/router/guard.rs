//! Navigation guard.
//!
//! [`decide`] is a pure function of the session and the target route's
//! metadata. The session is either `Anonymous` or `Authenticated`, judged
//! only by whether an access token is present.
//!
//! Precedence:
//! 1. authenticated user targeting the login route: go to the landing route
//! 2. public route: admit
//! 3. anonymous user: go to login, remembering the target
//! 4. role-gated route with no overlapping role: go to the forbidden page
//! 5. otherwise admit (following a route's declared redirect, if any)

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::router::routes::{strip_query, RouteDescriptor, RouteTable};
use crate::session::{Session, SessionStore, VisitedView};

/// Upper bound on redirects followed by a single navigation
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Admission {
    Admit,
    /// Anonymous user; `return_to` is where to go after logging in
    Login { return_to: String },
    /// Already authenticated, no reason to see the login page
    Landing,
    Forbidden,
    /// Route declares a redirect of its own
    Alias { to: String },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admit)
    }

    /// Where the navigation continues, or `None` when admitted
    pub fn target(&self, table: &RouteTable) -> Option<String> {
        match self {
            Admission::Admit => None,
            Admission::Login { return_to } => {
                Some(format!("{}?redirect={}", table.login_path, return_to))
            }
            Admission::Landing => Some(table.landing_path.clone()),
            Admission::Forbidden => Some(table.forbidden_path.clone()),
            Admission::Alias { to } => Some(to.clone()),
        }
    }
}

/// Decide whether `session` may enter `route`, requested as `path`
pub fn decide(
    session: &Session,
    path: &str,
    route: &RouteDescriptor,
    table: &RouteTable,
) -> Admission {
    let authenticated = session.is_authenticated();

    if authenticated && route.path == table.login_path {
        return Admission::Landing;
    }

    if route.requires_auth {
        if !authenticated {
            return Admission::Login {
                return_to: strip_query(path).to_string(),
            };
        }
        if !route.roles.is_empty() && !session.has_any_role(&route.roles) {
            return Admission::Forbidden;
        }
    }

    match &route.redirect {
        Some(to) => Admission::Alias { to: to.clone() },
        None => Admission::Admit,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("navigation to {path} exceeded the redirect limit")]
    RedirectLoop { path: String },
}

/// A completed navigation: where the user asked to go, where they ended up,
/// and every redirect decision along the way
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub requested: String,
    pub resolved: String,
    pub redirects: Vec<Admission>,
}

/// Guard bound to a route table and the shared session
#[derive(Clone)]
pub struct NavigationGuard {
    table: Arc<RouteTable>,
    session: Arc<SessionStore>,
}

impl NavigationGuard {
    pub fn new(table: Arc<RouteTable>, session: Arc<SessionStore>) -> Self {
        Self { table, session }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Evaluate a single navigation attempt without side effects
    pub fn check(&self, path: &str) -> Admission {
        let route = self.table.resolve(path);
        decide(&self.session.snapshot(), path, route, &self.table)
    }

    /// Follow redirects until a path is admitted, then record the visit
    pub fn navigate(&self, path: &str) -> Result<Navigation, NavigationError> {
        let mut current = path.to_string();
        let mut redirects = Vec::new();

        for _ in 0..=MAX_REDIRECTS {
            let admission = self.check(&current);
            match admission.target(&self.table) {
                None => {
                    self.record_visit(&current);
                    return Ok(Navigation {
                        requested: path.to_string(),
                        resolved: current,
                        redirects,
                    });
                }
                Some(next) => {
                    debug!("Navigation {} redirected to {}", current, next);
                    redirects.push(admission);
                    current = next;
                }
            }
        }

        Err(NavigationError::RedirectLoop {
            path: path.to_string(),
        })
    }

    fn record_visit(&self, path: &str) {
        let route = self.table.resolve(path);
        if route.hidden || !self.session.is_authenticated() {
            return;
        }
        let view = VisitedView::new(strip_query(path), route.title.clone(), route.affix);
        let cache_name = route.name.as_deref().filter(|_| route.keep_alive);
        self.session.record_view(view, cache_name);
    }
}
