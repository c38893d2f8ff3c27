use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use tracing::info;

use jobportal_auth::{Operation, Resource, ResourceKind, can_view};
use jobportal_core::FileuploadId;
use jobportal_profiles::{Fileupload, NewFileupload};

use crate::app::dto::{JsonBody, parse_id};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::{fileupload_owners, require};
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_fileuploads).post(create_fileupload))
        .route("/:id", get(get_fileupload).delete(delete_fileupload))
}

/// Scoped to what the caller may read: jobseekers get their own uploads.
pub async fn list_fileuploads(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<Fileupload>>, ApiError> {
    let actor = ctx.actor();
    require(actor, Operation::List, &Resource::collection(ResourceKind::Fileupload))?;

    let mut visible = Vec::new();
    for upload in services.store.list_fileuploads().await? {
        let owners = fileupload_owners(services.store.as_ref(), &upload).await?;
        if can_view(actor, &Resource::record(ResourceKind::Fileupload, owners)) {
            visible.push(upload);
        }
    }
    Ok(Json(visible))
}

pub async fn create_fileupload(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(body): JsonBody<NewFileupload>,
) -> Result<(StatusCode, Json<Fileupload>), ApiError> {
    let actor = ctx.actor();
    require(actor, Operation::Create, &Resource::collection(ResourceKind::Fileupload))?;

    let jobseeker = match body.jobseeker_id {
        Some(id) => services.store.get_jobseeker(id).await?,
        None => services.store.jobseeker_for_user(actor.user_id).await?,
    }
    .ok_or_else(|| ApiError::not_found("jobseeker"))?;

    require(actor, Operation::Create, &Resource::record(ResourceKind::Fileupload, [jobseeker.user_id]))?;

    let upload = body.into_upload(jobseeker.id, Utc::now())?;
    services.store.insert_fileupload(upload.clone()).await?;
    info!(fileupload_id = %upload.id, jobseeker_id = %jobseeker.id, "file upload recorded");
    Ok((StatusCode::CREATED, Json(upload)))
}

async fn load_fileupload(services: &AppServices, raw_id: &str) -> Result<(Fileupload, Resource), ApiError> {
    let id: FileuploadId = parse_id(raw_id)?;
    let upload = services.store.get_fileupload(id).await?.ok_or_else(|| ApiError::not_found("file upload"))?;
    let owners = fileupload_owners(services.store.as_ref(), &upload).await?;
    Ok((upload, Resource::record(ResourceKind::Fileupload, owners)))
}

pub async fn get_fileupload(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<Fileupload>, ApiError> {
    let (upload, resource) = load_fileupload(&services, &id).await?;
    require(ctx.actor(), Operation::Read, &resource)?;
    Ok(Json(upload))
}

pub async fn delete_fileupload(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let (upload, resource) = load_fileupload(&services, &id).await?;
    require(ctx.actor(), Operation::Delete, &resource)?;

    if !services.store.delete_fileupload(upload.id).await? {
        return Err(ApiError::not_found("file upload"));
    }
    Ok(StatusCode::NO_CONTENT)
}
