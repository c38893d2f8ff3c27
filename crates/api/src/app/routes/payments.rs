use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use tracing::info;

use jobportal_auth::{Operation, Resource, ResourceKind, can_view};
use jobportal_profiles::{NewPayment, Payment};

use crate::app::dto::JsonBody;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::{payment_owners, require};
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_payments).post(create_payment))
}

/// Admins see every payment; employers only their own.
pub async fn list_payments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let actor = ctx.actor();
    require(actor, Operation::List, &Resource::collection(ResourceKind::Payment))?;

    let mut visible = Vec::new();
    for payment in services.store.list_payments().await? {
        let owners = payment_owners(services.store.as_ref(), &payment).await?;
        if can_view(actor, &Resource::record(ResourceKind::Payment, owners)) {
            visible.push(payment);
        }
    }
    Ok(Json(visible))
}

/// Pay the fee for an employer and unlock jobseeker visibility for it.
///
/// The target is `employer_id` when given, else the caller's own employer
/// profile. Only that employer's owner or an admin may pay for it.
pub async fn create_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(body): JsonBody<NewPayment>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let actor = ctx.actor();
    require(actor, Operation::Create, &Resource::collection(ResourceKind::Payment))?;
    body.amount()?;

    let employer = match body.employer_id {
        Some(id) => services.store.get_employer(id).await?,
        None => services.store.employer_for_user(actor.user_id).await?,
    }
    .ok_or_else(|| ApiError::not_found("employer"))?;

    require(actor, Operation::Create, &Resource::record(ResourceKind::Payment, [employer.user_id]))?;

    let payment = body.into_payment(employer.id, Utc::now())?;
    let employer = services.store.record_payment(payment.clone()).await?;

    info!(
        payment_id = %payment.id,
        employer_id = %employer.id,
        paid_by = %actor.user_id,
        pay_to_view = employer.pay_to_view,
        "payment recorded"
    );
    Ok((StatusCode::CREATED, Json(payment)))
}
