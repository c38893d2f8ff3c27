//! Request/response DTOs and JSON extraction helpers.

use std::str::FromStr;

use axum::{
    Json,
    async_trait,
    extract::{FromRequest, Request},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use jobportal_core::DomainError;
use jobportal_profiles::User;

use crate::app::errors::ApiError;

/// JSON body extractor whose failures render as [`ApiError::Validation`]
/// (400) instead of axum's plain-text rejections.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<serde_json::Value>::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        serde_json::from_value(value)
            .map(JsonBody)
            .map_err(|e| ApiError::Validation(e.to_string()))
    }
}

/// Parse a path segment into a typed id.
pub fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(ApiError::from)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of signup/login responses. `token` is only set in token mode.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: Option<String>,
}
