use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub routes: RouteConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub current_user_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub default_roles: Vec<String>,
    pub keep_view_cache: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub landing_path: String,
}

impl ConsoleConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // API overrides
        if let Some(v) = lookup("EBBING_BASE_URL") {
            self.api.base_url = v;
        }
        if let Some(v) = lookup("EBBING_TIMEOUT_MS") {
            self.api.timeout_ms = v.parse().unwrap_or(self.api.timeout_ms);
        }
        if let Some(v) = lookup("EBBING_CURRENT_USER_PATH") {
            self.api.current_user_path = v;
        }

        // Session overrides
        if let Some(v) = lookup("EBBING_DEFAULT_ROLES") {
            let roles: Vec<String> = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !roles.is_empty() {
                self.session.default_roles = roles;
            }
        }
        if let Some(v) = lookup("EBBING_KEEP_VIEW_CACHE") {
            self.session.keep_view_cache = v.parse().unwrap_or(self.session.keep_view_cache);
        }

        // Route overrides
        if let Some(v) = lookup("EBBING_LANDING_PATH") {
            self.routes.landing_path = v;
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
                timeout_ms: 8000,
                current_user_path: "/user/profile".to_string(),
            },
            session: SessionConfig {
                default_roles: vec!["user".to_string()],
                keep_view_cache: false,
            },
            routes: RouteConfig {
                landing_path: "/knowledge".to_string(),
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.example.com/api".to_string(),
                timeout_ms: 8000,
                current_user_path: "/user/profile".to_string(),
            },
            session: SessionConfig {
                default_roles: vec!["user".to_string()],
                keep_view_cache: false,
            },
            routes: RouteConfig {
                landing_path: "/knowledge".to_string(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://app.example.com/api".to_string(),
                timeout_ms: 8000,
                current_user_path: "/user/profile".to_string(),
            },
            session: SessionConfig {
                default_roles: vec!["user".to_string()],
                keep_view_cache: false,
            },
            routes: RouteConfig {
                landing_path: "/knowledge".to_string(),
            },
        }
    }
}

// Global singleton config for the binary; library types take config at construction
pub static CONFIG: Lazy<ConsoleConfig> = Lazy::new(ConsoleConfig::from_env);

pub fn config() -> &'static ConsoleConfig {
    &CONFIG
}
