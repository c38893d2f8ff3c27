use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::info;

use jobportal_auth::{Identity, IssuedCredential, Role, hash_password, verify_password};
use jobportal_profiles::{Admin, NewUser, User};

use crate::app::dto::{AuthResponse, JsonBody, LoginRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::RequestContext;
use crate::middleware::{expired_session_cookie, session_cookie};

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<NewUser>,
) -> Result<Response, ApiError> {
    let (_email, password, role) = body.required()?;
    let password_hash = hash_password(&password)?;
    let user = body.into_user(password_hash, Utc::now())?;
    let admin = (role == Role::Admin).then(|| Admin::for_user(user.id));

    services.store.insert_user(user.clone(), admin).await?;
    info!(user_id = %user.id, role = %user.role, "user signed up");

    respond_with_credential(&services, StatusCode::CREATED, user)
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(ApiError::MissingField("email, password".to_string()));
    };

    let email = email.trim().to_lowercase();
    let user = services.store.find_user_by_email(&email).await?.ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    respond_with_credential(&services, StatusCode::OK, user)
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, ApiError> {
    services.identity.revoke(ctx.credential())?;
    info!(user_id = %ctx.user_id(), "user logged out");

    let mut res = StatusCode::NO_CONTENT.into_response();
    if let Ok(cookie) = HeaderValue::from_str(&expired_session_cookie(&services.cookie_name)) {
        res.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    Ok(res)
}

pub async fn check_session(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<User>, ApiError> {
    let user = services.store.get_user(ctx.user_id()).await?.ok_or(ApiError::Unauthorized)?;
    Ok(Json(user))
}

fn respond_with_credential(services: &AppServices, status: StatusCode, user: User) -> Result<Response, ApiError> {
    let issued = services
        .identity
        .issue(Identity { user_id: user.id, role: user.role }, Utc::now())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let (token, cookie) = match issued {
        IssuedCredential::Token(token) => (Some(token), None),
        IssuedCredential::Session(id) => (None, Some(session_cookie(&services.cookie_name, &id))),
    };

    let mut res = (status, Json(AuthResponse { user, token })).into_response();
    if let Some(cookie) = cookie {
        let value = HeaderValue::from_str(&cookie).map_err(|e| ApiError::Internal(e.to_string()))?;
        res.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(res)
}
