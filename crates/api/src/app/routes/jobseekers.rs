use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
};
use tracing::info;

use jobportal_auth::{Operation, Resource, ResourceKind};
use jobportal_core::JobseekerId;
use jobportal_profiles::{Jobseeker, JobseekerPatch, Patch};

use crate::app::dto::{JsonBody, parse_id};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_jobseekers).post(create_jobseeker))
        .route("/:id", get(get_jobseeker).patch(update_jobseeker).delete(delete_jobseeker))
}

/// Admins and paying employers only; everyone else gets 401 or 402.
pub async fn list_jobseekers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<Jobseeker>>, ApiError> {
    require(ctx.actor(), Operation::List, &Resource::collection(ResourceKind::Jobseeker))?;
    Ok(Json(services.store.list_jobseekers().await?))
}

pub async fn create_jobseeker(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(patch): JsonBody<JobseekerPatch>,
) -> Result<(StatusCode, Json<Jobseeker>), ApiError> {
    let actor = ctx.actor();
    require(actor, Operation::Create, &Resource::collection(ResourceKind::Jobseeker))?;
    if patch.touches_verification() {
        require(actor, Operation::Verify, &Resource::record(ResourceKind::Jobseeker, [actor.user_id]))?;
    }

    let mut jobseeker = Jobseeker::empty(actor.user_id);
    patch.apply_to(&mut jobseeker)?;
    services.store.insert_jobseeker(jobseeker.clone()).await?;

    info!(jobseeker_id = %jobseeker.id, user_id = %actor.user_id, "jobseeker profile created");
    Ok((StatusCode::CREATED, Json(jobseeker)))
}

async fn load_jobseeker(services: &AppServices, raw_id: &str) -> Result<(Jobseeker, Resource), ApiError> {
    let id: JobseekerId = parse_id(raw_id)?;
    let jobseeker = services.store.get_jobseeker(id).await?.ok_or_else(|| ApiError::not_found("jobseeker"))?;
    let resource = Resource::record(ResourceKind::Jobseeker, [jobseeker.user_id]);
    Ok((jobseeker, resource))
}

pub async fn get_jobseeker(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<Jobseeker>, ApiError> {
    let (jobseeker, resource) = load_jobseeker(&services, &id).await?;
    require(ctx.actor(), Operation::Read, &resource)?;
    Ok(Json(jobseeker))
}

pub async fn update_jobseeker(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<JobseekerPatch>,
) -> Result<Json<Jobseeker>, ApiError> {
    let (mut jobseeker, resource) = load_jobseeker(&services, &id).await?;
    require(ctx.actor(), Operation::Update, &resource)?;
    if patch.touches_verification() {
        require(ctx.actor(), Operation::Verify, &resource)?;
    }

    patch.apply_to(&mut jobseeker)?;
    services.store.update_jobseeker(&jobseeker).await?;
    Ok(Json(jobseeker))
}

pub async fn delete_jobseeker(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let (jobseeker, resource) = load_jobseeker(&services, &id).await?;
    require(ctx.actor(), Operation::Delete, &resource)?;

    if !services.store.delete_jobseeker(jobseeker.id).await? {
        return Err(ApiError::not_found("jobseeker"));
    }
    info!(jobseeker_id = %jobseeker.id, "jobseeker deleted with uploads and contact requests");
    Ok(StatusCode::NO_CONTENT)
}
