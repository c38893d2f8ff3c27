use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
};
use tracing::info;

use jobportal_auth::{Operation, Resource, ResourceKind};
use jobportal_core::UserId;
use jobportal_profiles::{Patch, User, UserPatch};

use crate::app::dto::{JsonBody, parse_id};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<User>>, ApiError> {
    require(ctx.actor(), Operation::List, &Resource::collection(ResourceKind::User))?;
    Ok(Json(services.store.list_users().await?))
}

async fn load_user(services: &AppServices, raw_id: &str) -> Result<(User, Resource), ApiError> {
    let id: UserId = parse_id(raw_id)?;
    let user = services.store.get_user(id).await?.ok_or_else(|| ApiError::not_found("user"))?;
    let resource = Resource::record(ResourceKind::User, [user.id]);
    Ok((user, resource))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let (user, resource) = load_user(&services, &id).await?;
    require(ctx.actor(), Operation::Read, &resource)?;
    Ok(Json(user))
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<UserPatch>,
) -> Result<Json<User>, ApiError> {
    let (mut user, resource) = load_user(&services, &id).await?;
    require(ctx.actor(), Operation::Update, &resource)?;
    if patch.touches_verification() {
        require(ctx.actor(), Operation::Verify, &resource)?;
    }

    patch.apply_to(&mut user)?;
    services.store.update_user(&user).await?;
    Ok(Json(user))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let (user, resource) = load_user(&services, &id).await?;
    require(ctx.actor(), Operation::Delete, &resource)?;

    if !services.store.delete_user(user.id).await? {
        return Err(ApiError::not_found("user"));
    }
    services.identity.revoke_user(user.id)?;
    info!(user_id = %user.id, deleted_by = %ctx.user_id(), "user deleted with dependents");
    Ok(StatusCode::NO_CONTENT)
}
