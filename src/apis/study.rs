use serde::{Deserialize, Serialize};

use crate::error::RequestError;
use crate::http::{ApiClient, RequestConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyLog {
    pub id: i64,
    pub entry_id: i64,
    #[serde(default)]
    pub note: Option<String>,
    pub logged_at: String,
    pub created_at: String,
}

/// Logs within a date window; the backend echoes the window it applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyLogWindow {
    pub items: Vec<StudyLog>,
    pub total: u64,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudyLogInput {
    pub entry_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logged_at: Option<String>,
}

pub async fn list_logs(
    client: &ApiClient,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<StudyLogWindow, RequestError> {
    let config = RequestConfig::get("/study/logs")
        .query_opt("start_date", start_date)
        .query_opt("end_date", end_date);
    client.send(config).await
}

pub async fn create_log(client: &ApiClient, input: &StudyLogInput) -> Result<StudyLog, RequestError> {
    client
        .send(RequestConfig::post("/study/logs").json(input)?)
        .await
}
