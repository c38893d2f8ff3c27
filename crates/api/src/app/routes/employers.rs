use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
};
use tracing::info;

use jobportal_auth::{Operation, Resource, ResourceKind};
use jobportal_core::EmployerId;
use jobportal_profiles::{Employer, EmployerPatch, Patch};

use crate::app::dto::{JsonBody, parse_id};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_employers).post(create_employer))
        .route("/:id", get(get_employer).patch(update_employer).delete(delete_employer))
}

/// Admin only.
pub async fn list_employers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<Employer>>, ApiError> {
    require(ctx.actor(), Operation::List, &Resource::collection(ResourceKind::Employer))?;
    Ok(Json(services.store.list_employers().await?))
}

pub async fn create_employer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(patch): JsonBody<EmployerPatch>,
) -> Result<(StatusCode, Json<Employer>), ApiError> {
    let actor = ctx.actor();
    require(actor, Operation::Create, &Resource::collection(ResourceKind::Employer))?;
    if patch.touches_verification() {
        require(actor, Operation::Verify, &Resource::record(ResourceKind::Employer, [actor.user_id]))?;
    }

    let mut employer = Employer::empty(actor.user_id);
    patch.apply_to(&mut employer)?;
    services.store.insert_employer(employer.clone()).await?;

    info!(employer_id = %employer.id, user_id = %actor.user_id, "employer profile created");
    Ok((StatusCode::CREATED, Json(employer)))
}

async fn load_employer(services: &AppServices, raw_id: &str) -> Result<(Employer, Resource), ApiError> {
    let id: EmployerId = parse_id(raw_id)?;
    let employer = services.store.get_employer(id).await?.ok_or_else(|| ApiError::not_found("employer"))?;
    let resource = Resource::record(ResourceKind::Employer, [employer.user_id]);
    Ok((employer, resource))
}

pub async fn get_employer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<Employer>, ApiError> {
    let (employer, resource) = load_employer(&services, &id).await?;
    require(ctx.actor(), Operation::Read, &resource)?;
    Ok(Json(employer))
}

pub async fn update_employer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<EmployerPatch>,
) -> Result<Json<Employer>, ApiError> {
    let (mut employer, resource) = load_employer(&services, &id).await?;
    require(ctx.actor(), Operation::Update, &resource)?;
    if patch.touches_verification() {
        require(ctx.actor(), Operation::Verify, &resource)?;
    }

    patch.apply_to(&mut employer)?;
    services.store.update_employer(&employer).await?;
    Ok(Json(employer))
}

pub async fn delete_employer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let (employer, resource) = load_employer(&services, &id).await?;
    require(ctx.actor(), Operation::Delete, &resource)?;

    if !services.store.delete_employer(employer.id).await? {
        return Err(ApiError::not_found("employer"));
    }
    info!(employer_id = %employer.id, "employer deleted with payments and contact requests");
    Ok(StatusCode::NO_CONTENT)
}
