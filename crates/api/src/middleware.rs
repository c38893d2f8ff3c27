use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use jobportal_auth::{Actor, Credential, Role, SessionId};
use jobportal_infra::AuthMode;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::RequestContext;

/// Resolve the request's credential to an [`Actor`] and attach a
/// [`RequestContext`]. Any failure is a JSON 401.
pub async fn auth_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = extract_credential(req.headers(), services.auth_mode, &services.cookie_name)?;

    let identity = services.identity.resolve(&credential, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "credential rejected");
        ApiError::from(e)
    })?;

    // The account may have been deleted since the credential was issued.
    let user = services.store.get_user(identity.user_id).await?.ok_or(ApiError::Unauthorized)?;

    let pay_to_view = match user.role {
        Role::Employer => services
            .store
            .employer_for_user(user.id)
            .await?
            .is_some_and(|e| e.pay_to_view),
        Role::Jobseeker | Role::Admin => false,
    };

    let actor = Actor::new(user.id, user.role).with_pay_to_view(pay_to_view);
    req.extensions_mut().insert(RequestContext::new(actor, credential));

    Ok(next.run(req).await)
}

fn extract_credential(headers: &HeaderMap, mode: AuthMode, cookie_name: &str) -> Result<Credential, ApiError> {
    match mode {
        AuthMode::Session => {
            extract_cookie(headers, cookie_name).map(|v| Credential::SessionCookie(SessionId::from_cookie(v)))
        }
        AuthMode::Token => extract_bearer(headers).map(|t| Credential::Bearer(t.to_string())),
    }
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers.get(header::AUTHORIZATION).ok_or(ApiError::Unauthorized)?;

    let header = header.to_str().map_err(|_| ApiError::Unauthorized)?;

    let header = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(ApiError::Unauthorized);
    }

    Ok(token)
}

fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v)
        .ok_or(ApiError::Unauthorized)
}

/// `Set-Cookie` value carrying a fresh session id.
pub fn session_cookie(name: &str, id: &SessionId) -> String {
    format!("{name}={}; Path=/; HttpOnly; SameSite=Lax", id.as_str())
}

/// `Set-Cookie` value that clears the session cookie.
pub fn expired_session_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
