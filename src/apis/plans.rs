use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::apis::Listing;
use crate::error::RequestError;
use crate::http::{ApiClient, RequestConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum PlanStatus {
    NotStarted,
    InProgress,
    Completed,
    Delayed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
    Blocked,
    Delayed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    pub priority: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: PlanStatus,
    pub progress: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: i64,
    pub plan_id: i64,
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub estimate_minutes: Option<u32>,
    pub priority: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub order_no: i32,
    #[serde(default)]
    pub focus_minutes: u32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDetail {
    #[serde(flatten)]
    pub plan: PlanItem,
    #[serde(default)]
    pub tasks: Vec<TaskItem>,
}

#[derive(Debug, Clone, Default)]
pub struct PlanQuery {
    pub status: Option<PlanStatus>,
    pub priority: Option<String>,
    pub tag: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PlanStatus>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::NotStarted => "not_started",
            PlanStatus::InProgress => "in_progress",
            PlanStatus::Completed => "completed",
            PlanStatus::Delayed => "delayed",
        }
    }
}

pub async fn list_plans(client: &ApiClient, query: &PlanQuery) -> Result<Listing<PlanItem>, RequestError> {
    let config = RequestConfig::get("/plans")
        .query_opt("status", query.status.map(|s| s.as_str()))
        .query_opt("priority", query.priority.as_deref())
        .query_opt("tag", query.tag.as_deref())
        .query_opt("start_date", query.start_date.as_deref())
        .query_opt("end_date", query.end_date.as_deref());
    client.send(config).await
}

pub async fn get_plan(client: &ApiClient, id: i64) -> Result<PlanDetail, RequestError> {
    client.send(RequestConfig::get(format!("/plans/{}", id))).await
}

pub async fn create_plan(client: &ApiClient, input: &PlanInput) -> Result<PlanItem, RequestError> {
    client.send(RequestConfig::post("/plans").json(input)?).await
}

pub async fn update_plan(
    client: &ApiClient,
    id: i64,
    input: &PlanInput,
) -> Result<PlanItem, RequestError> {
    client
        .send(RequestConfig::put(format!("/plans/{}", id)).json(input)?)
        .await
}

pub async fn delete_plan(client: &ApiClient, id: i64) -> Result<(), RequestError> {
    let _: IgnoredAny = client
        .send(RequestConfig::delete(format!("/plans/{}", id)))
        .await?;
    Ok(())
}

pub async fn create_task(
    client: &ApiClient,
    plan_id: i64,
    input: &TaskInput,
) -> Result<TaskItem, RequestError> {
    client
        .send(RequestConfig::post(format!("/plans/{}/tasks", plan_id)).json(input)?)
        .await
}

pub async fn update_task(
    client: &ApiClient,
    task_id: i64,
    input: &TaskInput,
) -> Result<TaskItem, RequestError> {
    client
        .send(RequestConfig::put(format!("/tasks/{}", task_id)).json(input)?)
        .await
}

pub async fn complete_task(client: &ApiClient, task_id: i64) -> Result<TaskItem, RequestError> {
    client
        .send(RequestConfig::post(format!("/tasks/{}/complete", task_id)))
        .await
}
