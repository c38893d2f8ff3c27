use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobportal_core::{DomainError, DomainResult, Entity, FileuploadId, JobseekerId};

use crate::patch::required_text;

/// Metadata for a document (CV, certificate) attached to a jobseeker profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fileupload {
    pub id: FileuploadId,
    pub jobseeker_id: JobseekerId,
    pub file_path: String,
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Entity for Fileupload {
    type Id = FileuploadId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Request body for `POST /fileuploads`. Jobseekers may omit `jobseeker_id`
/// (their own profile is used); admins must name one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewFileupload {
    pub jobseeker_id: Option<JobseekerId>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
}

impl NewFileupload {
    pub fn into_upload(self, jobseeker_id: JobseekerId, now: DateTime<Utc>) -> DomainResult<Fileupload> {
        let (Some(path), Some(kind)) = (self.file_path, self.file_type) else {
            return Err(DomainError::missing_field("file_path, file_type"));
        };
        Ok(Fileupload {
            id: FileuploadId::new(),
            jobseeker_id,
            file_path: required_text("file_path", &path)?,
            file_type: required_text("file_type", &kind)?.to_lowercase(),
            uploaded_at: now,
        })
    }
}
