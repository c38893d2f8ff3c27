//! Handler-side policy checks and record ownership lookups.
//!
//! Handlers load the record, derive its owners here, then ask the policy
//! engine. Every non-allowed decision is logged with its explanation.

use jobportal_auth::{Actor, Operation, Resource, explain};
use jobportal_core::UserId;
use jobportal_infra::EntityStore;
use jobportal_profiles::{ContactRequest, Fileupload, Payment};

use crate::app::errors::ApiError;

/// Ask the policy engine; `Ok(())` only on `Allow`.
pub fn require(actor: &Actor, operation: Operation, resource: &Resource) -> Result<(), ApiError> {
    let explanation = explain(Some(actor), operation, resource);
    jobportal_observability::audit::policy_decision(&explanation);
    explanation.decision.into_result().map_err(ApiError::from)
}

/// Employer's user and jobseeker's user. A side whose profile is gone
/// contributes no owner.
pub async fn contact_request_owners(
    store: &dyn EntityStore,
    request: &ContactRequest,
) -> Result<Vec<UserId>, ApiError> {
    let mut owners = Vec::with_capacity(2);
    if let Some(employer) = store.get_employer(request.employer_id).await? {
        owners.push(employer.user_id);
    }
    if let Some(jobseeker) = store.get_jobseeker(request.jobseeker_id).await? {
        owners.push(jobseeker.user_id);
    }
    Ok(owners)
}

pub async fn payment_owners(store: &dyn EntityStore, payment: &Payment) -> Result<Vec<UserId>, ApiError> {
    Ok(store.get_employer(payment.employer_id).await?.map(|e| e.user_id).into_iter().collect())
}

pub async fn fileupload_owners(store: &dyn EntityStore, upload: &Fileupload) -> Result<Vec<UserId>, ApiError> {
    Ok(store.get_jobseeker(upload.jobseeker_id).await?.map(|j| j.user_id).into_iter().collect())
}
