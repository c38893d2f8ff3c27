use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobportal_core::{ContactRequestId, DomainError, DomainResult, EmployerId, Entity, JobseekerId};

use crate::patch::{Patch, required_text};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Pending => "pending",
            ContactStatus::Accepted => "accepted",
            ContactStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ContactStatus::Pending),
            "accepted" => Ok(ContactStatus::Accepted),
            "declined" => Ok(ContactStatus::Declined),
            other => Err(DomainError::validation(format!("unknown contact status '{other}'"))),
        }
    }
}

/// An employer reaching out to a jobseeker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRequest {
    pub id: ContactRequestId,
    pub employer_id: EmployerId,
    pub jobseeker_id: JobseekerId,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

impl Entity for ContactRequest {
    type Id = ContactRequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Request body for `POST /contact_requests`. The employer is always the caller's own.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewContactRequest {
    #[serde(alias = "jobseekerID")]
    pub jobseeker_id: Option<JobseekerId>,
    pub message: Option<String>,
}

impl NewContactRequest {
    pub fn into_request(self, employer_id: EmployerId, now: DateTime<Utc>) -> DomainResult<ContactRequest> {
        let (Some(jobseeker_id), Some(message)) = (self.jobseeker_id, self.message) else {
            return Err(DomainError::missing_field("jobseeker_id, message"));
        };
        Ok(ContactRequest {
            id: ContactRequestId::new(),
            employer_id,
            jobseeker_id,
            message: required_text("message", &message)?,
            status: ContactStatus::Pending,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactRequestPatch {
    pub message: Option<String>,
    pub status: Option<ContactStatus>,
}

impl Patch<ContactRequest> for ContactRequestPatch {
    fn apply_to(self, request: &mut ContactRequest) -> DomainResult<()> {
        let message = self.message.map(|m| required_text("message", &m)).transpose()?;
        if let Some(m) = message {
            request.message = m;
        }
        if let Some(s) = self.status {
            request.status = s;
        }
        Ok(())
    }
}
