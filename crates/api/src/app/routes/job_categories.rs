use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    routing::get,
};

use jobportal_auth::{Operation, Resource, ResourceKind};
use jobportal_profiles::{JobCategory, NewJobCategory};

use crate::app::dto::JsonBody;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_job_categories).post(create_job_category))
}

pub async fn list_job_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<JobCategory>>, ApiError> {
    require(ctx.actor(), Operation::List, &Resource::collection(ResourceKind::JobCategory))?;
    Ok(Json(services.store.list_job_categories().await?))
}

pub async fn create_job_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(body): JsonBody<NewJobCategory>,
) -> Result<(StatusCode, Json<JobCategory>), ApiError> {
    require(ctx.actor(), Operation::Create, &Resource::collection(ResourceKind::JobCategory))?;
    let category = body.into_category()?;
    services.store.insert_job_category(category.clone()).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
