//! Access policy engine.
//!
//! Given an actor, an operation and a resource, decide whether the request may
//! proceed, is denied, or is held behind the paywall. Decisions are pure
//! functions of their inputs:
//!
//! - No IO
//! - No panics
//! - No side effects (the caller performs the store operation on `Allow`)

use serde::Serialize;
use thiserror::Error;

use jobportal_core::UserId;

use crate::{Actor, Role};

/// Operation requested on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Read,
    Create,
    Update,
    Delete,
    /// Flip the `verified` flag of a user account.
    Verify,
}

/// Kind of resource the policy reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    User,
    Jobseeker,
    Employer,
    ContactRequest,
    Payment,
    Fileupload,
    JobCategory,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Jobseeker => "jobseeker",
            ResourceKind::Employer => "employer",
            ResourceKind::ContactRequest => "contact_request",
            ResourceKind::Payment => "payment",
            ResourceKind::Fileupload => "fileupload",
            ResourceKind::JobCategory => "job_category",
        }
    }

    /// Content owned by a jobseeker that paying employers are allowed to browse.
    fn is_paywalled(&self) -> bool {
        matches!(self, ResourceKind::Jobseeker | ResourceKind::Fileupload)
    }
}

/// Target of an operation: a whole collection or one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Collection(ResourceKind),
    /// A single record, with the user ids that own it.
    ///
    /// Contact requests have two owners (the employer's and the jobseeker's
    /// user); payments are owned by the paying employer's user.
    Record { kind: ResourceKind, owners: Vec<UserId> },
}

impl Resource {
    pub fn collection(kind: ResourceKind) -> Self {
        Self::Collection(kind)
    }

    pub fn record(kind: ResourceKind, owners: impl IntoIterator<Item = UserId>) -> Self {
        Self::Record {
            kind,
            owners: owners.into_iter().collect(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Collection(kind) => *kind,
            Resource::Record { kind, .. } => *kind,
        }
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No authenticated actor.
    Unauthenticated,
    /// The actor's role may never perform this operation.
    RoleNotPermitted,
    /// The actor neither owns the record nor is an admin.
    NotOwner,
}

impl core::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DenyReason::Unauthenticated => f.write_str("unauthorized"),
            DenyReason::RoleNotPermitted => f.write_str("role not permitted"),
            DenyReason::NotOwner => f.write_str("not the owner of this record"),
        }
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny(DenyReason),
    /// Denied because the employer has not paid to view jobseekers yet.
    Paywall,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), AuthzError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::Unauthenticated) => Err(AuthzError::Unauthenticated),
            Decision::Deny(reason) => Err(AuthzError::Forbidden(reason)),
            Decision::Paywall => Err(AuthzError::Paywall),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unauthorized")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(DenyReason),

    #[error("pay to view")]
    Paywall,
}

/// Decide whether `actor` may perform `operation` on `resource`.
pub fn authorize(actor: Option<&Actor>, operation: Operation, resource: &Resource) -> Decision {
    let Some(actor) = actor else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    match resource {
        Resource::Collection(kind) => authorize_collection(actor, operation, *kind),
        Resource::Record { kind, owners } => authorize_record(actor, operation, *kind, owners),
    }
}

/// `true` if `actor` may read `resource`; used to scope collection listings.
pub fn can_view(actor: &Actor, resource: &Resource) -> bool {
    authorize(Some(actor), Operation::Read, resource).is_allowed()
}

fn authorize_collection(actor: &Actor, operation: Operation, kind: ResourceKind) -> Decision {
    match operation {
        Operation::List => list_collection(actor, kind),
        Operation::Create => create_in_collection(actor, kind),
        Operation::Read | Operation::Update | Operation::Delete | Operation::Verify => {
            admin_only(actor)
        }
    }
}

fn list_collection(actor: &Actor, kind: ResourceKind) -> Decision {
    match kind {
        ResourceKind::Jobseeker | ResourceKind::Fileupload => match actor.role {
            Role::Admin => Decision::Allow,
            Role::Employer => paywall_gate(actor),
            // Jobseekers only ever see their own uploads; the listing is scoped.
            Role::Jobseeker if kind == ResourceKind::Fileupload => Decision::Allow,
            Role::Jobseeker => Decision::Deny(DenyReason::RoleNotPermitted),
        },
        ResourceKind::Employer | ResourceKind::User | ResourceKind::ContactRequest => {
            admin_only(actor)
        }
        ResourceKind::Payment => match actor.role {
            Role::Admin | Role::Employer => Decision::Allow,
            Role::Jobseeker => Decision::Deny(DenyReason::RoleNotPermitted),
        },
        ResourceKind::JobCategory => Decision::Allow,
    }
}

fn create_in_collection(actor: &Actor, kind: ResourceKind) -> Decision {
    let permitted = match kind {
        // A profile is owned by exactly one user of the matching role.
        ResourceKind::Jobseeker => actor.role == Role::Jobseeker,
        ResourceKind::Employer => actor.role == Role::Employer,
        ResourceKind::ContactRequest => actor.role == Role::Employer,
        ResourceKind::Payment => matches!(actor.role, Role::Employer | Role::Admin),
        ResourceKind::Fileupload => matches!(actor.role, Role::Jobseeker | Role::Admin),
        ResourceKind::User | ResourceKind::JobCategory => actor.is_admin(),
    };

    if permitted {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::RoleNotPermitted)
    }
}

fn authorize_record(
    actor: &Actor,
    operation: Operation,
    kind: ResourceKind,
    owners: &[UserId],
) -> Decision {
    if operation == Operation::Verify {
        return admin_only(actor);
    }

    if actor.is_admin() || owners.contains(&actor.user_id) {
        return Decision::Allow;
    }

    match operation {
        Operation::Read | Operation::List if kind.is_paywalled() => match actor.role {
            Role::Employer => paywall_gate(actor),
            Role::Jobseeker | Role::Admin => Decision::Deny(DenyReason::NotOwner),
        },
        _ => Decision::Deny(DenyReason::NotOwner),
    }
}

fn paywall_gate(actor: &Actor) -> Decision {
    if actor.pay_to_view {
        Decision::Allow
    } else {
        Decision::Paywall
    }
}

fn admin_only(actor: &Actor) -> Decision {
    if actor.is_admin() {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::RoleNotPermitted)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Structured account of a policy decision, suitable for logging.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionExplanation {
    pub operation: Operation,
    pub resource: ResourceKind,
    pub role: Option<Role>,
    pub user_id: Option<UserId>,
    pub decision: Decision,
    /// Human-readable reason for the decision.
    pub reason: String,
}

/// Evaluate the policy and explain the outcome.
pub fn explain(actor: Option<&Actor>, operation: Operation, resource: &Resource) -> DecisionExplanation {
    let decision = authorize(actor, operation, resource);
    let kind = resource.kind();

    let reason = match (decision, actor) {
        (Decision::Allow, Some(a)) if a.is_admin() => "admin may access every resource".to_string(),
        (Decision::Allow, Some(a)) => match resource {
            Resource::Record { owners, .. } if owners.contains(&a.user_id) => {
                format!("actor owns this {}", kind.as_str())
            }
            _ => format!("role '{}' may {:?} {}", a.role, operation, kind.as_str()),
        },
        (Decision::Allow, None) => "allowed".to_string(),
        (Decision::Paywall, _) => "employer has not paid to view jobseekers".to_string(),
        (Decision::Deny(r), Some(a)) => {
            format!("role '{}' cannot {:?} {}: {}", a.role, operation, kind.as_str(), r)
        }
        (Decision::Deny(r), None) => r.to_string(),
    };

    DecisionExplanation {
        operation,
        resource: kind,
        role: actor.map(|a| a.role),
        user_id: actor.map(|a| a.user_id),
        decision,
        reason,
    }
}
