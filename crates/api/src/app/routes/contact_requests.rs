use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use tracing::{info, warn};

use jobportal_auth::{Operation, Resource, ResourceKind};
use jobportal_core::{ContactRequestId, UserId};
use jobportal_infra::Notification;
use jobportal_profiles::{ContactRequest, ContactRequestPatch, Employer, NewContactRequest, Patch};

use crate::app::dto::{JsonBody, parse_id};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::{contact_request_owners, require};
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_contact_requests).post(create_contact_request))
        .route(
            "/:id",
            get(get_contact_request).patch(update_contact_request).delete(delete_contact_request),
        )
}

pub async fn list_contact_requests(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<ContactRequest>>, ApiError> {
    require(ctx.actor(), Operation::List, &Resource::collection(ResourceKind::ContactRequest))?;
    Ok(Json(services.store.list_contact_requests().await?))
}

/// An employer reaches out to a jobseeker; the jobseeker is emailed.
pub async fn create_contact_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(body): JsonBody<NewContactRequest>,
) -> Result<(StatusCode, Json<ContactRequest>), ApiError> {
    let actor = ctx.actor();
    require(actor, Operation::Create, &Resource::collection(ResourceKind::ContactRequest))?;

    let employer = services
        .store
        .employer_for_user(actor.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("employer profile"))?;
    let request = body.into_request(employer.id, Utc::now())?;
    let jobseeker = services
        .store
        .get_jobseeker(request.jobseeker_id)
        .await?
        .ok_or_else(|| ApiError::not_found("jobseeker"))?;

    services.store.insert_contact_request(request.clone()).await?;
    info!(contact_request_id = %request.id, jobseeker_id = %jobseeker.id, "contact request created");

    notify_jobseeker(&services, &employer, jobseeker.user_id, &request).await;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Best-effort: failures are logged, never surfaced.
async fn notify_jobseeker(
    services: &AppServices,
    employer: &Employer,
    jobseeker_user: UserId,
    request: &ContactRequest,
) {
    let user = match services.store.get_user(jobseeker_user).await {
        Ok(Some(user)) => user,
        Ok(None) => return,
        Err(e) => {
            warn!(error = %e, "could not load jobseeker for notification");
            return;
        }
    };

    let notification =
        Notification::contact_request(&user.email, employer.company_name.as_deref(), &request.message);
    if let Err(e) = services.notifier.send(&notification).await {
        warn!(error = %e, contact_request_id = %request.id, "contact request notification failed");
    }
}

async fn load_contact_request(
    services: &AppServices,
    raw_id: &str,
) -> Result<(ContactRequest, Resource), ApiError> {
    let id: ContactRequestId = parse_id(raw_id)?;
    let request = services
        .store
        .get_contact_request(id)
        .await?
        .ok_or_else(|| ApiError::not_found("contact request"))?;
    let owners = contact_request_owners(services.store.as_ref(), &request).await?;
    Ok((request, Resource::record(ResourceKind::ContactRequest, owners)))
}

pub async fn get_contact_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<ContactRequest>, ApiError> {
    let (request, resource) = load_contact_request(&services, &id).await?;
    require(ctx.actor(), Operation::Read, &resource)?;
    Ok(Json(request))
}

pub async fn update_contact_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<ContactRequestPatch>,
) -> Result<Json<ContactRequest>, ApiError> {
    let (mut request, resource) = load_contact_request(&services, &id).await?;
    require(ctx.actor(), Operation::Update, &resource)?;

    patch.apply_to(&mut request)?;
    services.store.update_contact_request(&request).await?;
    Ok(Json(request))
}

pub async fn delete_contact_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let (request, resource) = load_contact_request(&services, &id).await?;
    require(ctx.actor(), Operation::Delete, &resource)?;

    if !services.store.delete_contact_request(request.id).await? {
        return Err(ApiError::not_found("contact request"));
    }
    Ok(StatusCode::NO_CONTENT)
}
