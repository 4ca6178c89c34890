use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;
use crate::http::{ApiClient, RequestConfig};
use crate::session::TokenPair;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Email or phone number
    pub account: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

pub async fn login(client: &ApiClient, request: &LoginRequest) -> Result<LoginResponse, RequestError> {
    client
        .send(RequestConfig::post("/auth/login").json(request)?)
        .await
}

pub async fn register(
    client: &ApiClient,
    request: &RegisterRequest,
) -> Result<LoginResponse, RequestError> {
    client
        .send(RequestConfig::post("/auth/register").json(request)?)
        .await
}

/// Trade a refresh token for a new access token
pub async fn refresh(client: &ApiClient, refresh_token: &str) -> Result<RefreshResponse, RequestError> {
    client
        .send(RequestConfig::post("/auth/refresh").bearer(refresh_token))
        .await
}

/// Revoke the current access token server-side
pub async fn logout(client: &ApiClient) -> Result<(), RequestError> {
    let _: IgnoredAny = client.send(RequestConfig::post("/auth/logout")).await?;
    Ok(())
}
