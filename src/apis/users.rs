use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RequestError;
use crate::http::{ApiClient, RequestConfig};

/// Identity and roles of the logged-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub prefs: Option<Map<String, Value>>,
}

pub async fn current_user(client: &ApiClient, path: &str) -> Result<CurrentUser, RequestError> {
    client.send(RequestConfig::get(path)).await
}
