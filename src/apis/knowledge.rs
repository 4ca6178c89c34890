use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::apis::Listing;
use crate::error::RequestError;
use crate::http::{ApiClient, RequestConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub topic_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPage {
    pub items: Vec<KnowledgeEntry>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TopicInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// Partial entry; unset fields are left out of the payload
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct EntryQuery {
    pub keyword: Option<String>,
    pub tag: Option<String>,
    pub topic_id: Option<i64>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub async fn list_topics(client: &ApiClient) -> Result<Listing<Topic>, RequestError> {
    client.send(RequestConfig::get("/knowledge/topics")).await
}

pub async fn create_topic(client: &ApiClient, input: &TopicInput) -> Result<Topic, RequestError> {
    client
        .send(RequestConfig::post("/knowledge/topics").json(input)?)
        .await
}

pub async fn update_topic(
    client: &ApiClient,
    id: i64,
    input: &TopicInput,
) -> Result<Topic, RequestError> {
    client
        .send(RequestConfig::put(format!("/knowledge/topics/{}", id)).json(input)?)
        .await
}

pub async fn delete_topic(client: &ApiClient, id: i64) -> Result<(), RequestError> {
    let _: IgnoredAny = client
        .send(RequestConfig::delete(format!("/knowledge/topics/{}", id)))
        .await?;
    Ok(())
}

pub async fn list_entries(client: &ApiClient, query: &EntryQuery) -> Result<EntryPage, RequestError> {
    let config = RequestConfig::get("/knowledge/entries")
        .query_opt("keyword", query.keyword.as_deref())
        .query_opt("tag", query.tag.as_deref())
        .query_opt("topic_id", query.topic_id)
        .query_opt("page", query.page)
        .query_opt("page_size", query.page_size);
    client.send(config).await
}

pub async fn create_entry(
    client: &ApiClient,
    input: &EntryInput,
) -> Result<KnowledgeEntry, RequestError> {
    client
        .send(RequestConfig::post("/knowledge/entries").json(input)?)
        .await
}

pub async fn update_entry(
    client: &ApiClient,
    id: i64,
    input: &EntryInput,
) -> Result<KnowledgeEntry, RequestError> {
    client
        .send(RequestConfig::put(format!("/knowledge/entries/{}", id)).json(input)?)
        .await
}

pub async fn delete_entry(client: &ApiClient, id: i64) -> Result<(), RequestError> {
    let _: IgnoredAny = client
        .send(RequestConfig::delete(format!("/knowledge/entries/{}", id)))
        .await?;
    Ok(())
}
