use std::collections::BTreeSet;

use serde::Serialize;

/// Static metadata for one route. Immutable once the table is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    /// Exact path, or a prefix ending in `/*` that matches everything below it
    pub path: String,
    pub name: Option<String>,
    pub title: Option<String>,
    /// Empty means any authenticated user
    pub roles: BTreeSet<String>,
    pub requires_auth: bool,
    pub hidden: bool,
    pub affix: bool,
    pub keep_alive: bool,
    pub redirect: Option<String>,
}

impl RouteDescriptor {
    fn new(path: &str, requires_auth: bool) -> Self {
        Self {
            path: path.to_string(),
            name: None,
            title: None,
            roles: BTreeSet::new(),
            requires_auth,
            hidden: false,
            affix: false,
            keep_alive: false,
            redirect: None,
        }
    }

    pub fn public(path: &str) -> Self {
        Self::new(path, false)
    }

    pub fn authenticated(path: &str) -> Self {
        Self::new(path, true)
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn affix(mut self) -> Self {
        self.affix = true;
        self
    }

    pub fn keep_alive(mut self) -> Self {
        self.keep_alive = true;
        self
    }

    pub fn redirect_to(mut self, target: &str) -> Self {
        self.redirect = Some(target.to_string());
        self
    }

    pub fn matches(&self, path: &str) -> bool {
        match self.path.strip_suffix("/*") {
            Some(prefix) => path == prefix || path.starts_with(&format!("{}/", prefix)),
            None => self.path == path,
        }
    }
}

/// The route table plus the well-known system paths the guard redirects to
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
    pub login_path: String,
    pub forbidden_path: String,
    pub not_found_path: String,
    pub landing_path: String,
    fallback: RouteDescriptor,
}

impl RouteTable {
    pub const LOGIN_PATH: &'static str = "/login";
    pub const FORBIDDEN_PATH: &'static str = "/403";
    pub const NOT_FOUND_PATH: &'static str = "/404";

    /// Build a table; login, forbidden and not-found routes are added as
    /// public hidden routes when the caller did not declare them.
    pub fn new(routes: Vec<RouteDescriptor>, landing_path: &str) -> Self {
        let mut table = Self {
            routes,
            login_path: Self::LOGIN_PATH.to_string(),
            forbidden_path: Self::FORBIDDEN_PATH.to_string(),
            not_found_path: Self::NOT_FOUND_PATH.to_string(),
            landing_path: landing_path.to_string(),
            fallback: RouteDescriptor::public(Self::NOT_FOUND_PATH).hidden(),
        };
        for system in [Self::LOGIN_PATH, Self::FORBIDDEN_PATH, Self::NOT_FOUND_PATH] {
            if table.find(system).is_none() {
                table.routes.push(RouteDescriptor::public(system).hidden());
            }
        }
        table
    }

    /// The console's own routes
    pub fn default_console(landing_path: &str) -> Self {
        Self::new(
            vec![
                RouteDescriptor::authenticated("/redirect/*").hidden(),
                RouteDescriptor::public(Self::FORBIDDEN_PATH).hidden(),
                RouteDescriptor::public(Self::NOT_FOUND_PATH).hidden(),
                RouteDescriptor::public(Self::LOGIN_PATH).hidden(),
                RouteDescriptor::authenticated("/").redirect_to(landing_path),
                RouteDescriptor::authenticated("/knowledge")
                    .named("Knowledge")
                    .titled("Knowledge")
                    .affix(),
                RouteDescriptor::authenticated("/plans")
                    .named("Plans")
                    .titled("Plans")
                    .keep_alive(),
                RouteDescriptor::authenticated("/study-logs")
                    .named("StudyLogs")
                    .titled("Study logs")
                    .keep_alive(),
            ],
            landing_path,
        )
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    fn find(&self, path: &str) -> Option<&RouteDescriptor> {
        // exact declarations win over wildcard prefixes
        self.routes
            .iter()
            .find(|r| r.path == path)
            .or_else(|| self.routes.iter().find(|r| r.matches(path)))
    }

    /// Route for `path` (query string ignored); unknown paths resolve to the
    /// not-found route.
    pub fn resolve(&self, path: &str) -> &RouteDescriptor {
        let bare = strip_query(path);
        self.find(bare)
            .or_else(|| self.find(&self.not_found_path))
            .unwrap_or(&self.fallback)
    }

    /// Menu entries visible to a holder of `roles`
    pub fn visible_routes<'a>(
        &'a self,
        roles: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = &'a RouteDescriptor> + 'a {
        self.routes.iter().filter(move |r| {
            !r.hidden
                && r.redirect.is_none()
                && (r.roles.is_empty() || r.roles.iter().any(|role| roles.contains(role)))
        })
    }
}

pub(crate) fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}
