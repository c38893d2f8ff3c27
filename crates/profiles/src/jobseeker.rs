use serde::{Deserialize, Serialize};

use jobportal_core::{DomainResult, Entity, FileuploadId, JobCategoryId, JobseekerId, UserId};

use crate::patch::{Patch, optional_text, validate_non_negative};

/// Jobseeker profile, owned by exactly one jobseeker account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Jobseeker {
    pub id: JobseekerId,
    pub user_id: UserId,
    pub prof_pic: Option<String>,
    pub fileupload_id: Option<FileuploadId>,
    pub bio: Option<String>,
    pub availability: Option<bool>,
    pub job_category_id: Option<JobCategoryId>,
    pub salary_expectation: Option<f64>,
    pub verification_status: bool,
    pub work_experience: Option<String>,
    pub education: Option<String>,
    pub skills: Option<String>,
}

impl Jobseeker {
    /// Empty profile for `user_id`; populate it with a [`JobseekerPatch`].
    pub fn empty(user_id: UserId) -> Self {
        Self {
            id: JobseekerId::new(),
            user_id,
            prof_pic: None,
            fileupload_id: None,
            bio: None,
            availability: None,
            job_category_id: None,
            salary_expectation: None,
            verification_status: false,
            work_experience: None,
            education: None,
            skills: None,
        }
    }
}

impl Entity for Jobseeker {
    type Id = JobseekerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Fields of a jobseeker profile a client may set, on create and on patch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobseekerPatch {
    pub prof_pic: Option<String>,
    pub fileupload_id: Option<FileuploadId>,
    pub bio: Option<String>,
    pub availability: Option<bool>,
    pub job_category_id: Option<JobCategoryId>,
    pub salary_expectation: Option<f64>,
    pub work_experience: Option<String>,
    pub education: Option<String>,
    pub skills: Option<String>,
    /// Admin-only.
    pub verification_status: Option<bool>,
}

impl Patch<Jobseeker> for JobseekerPatch {
    fn touches_verification(&self) -> bool {
        self.verification_status.is_some()
    }

    fn apply_to(self, js: &mut Jobseeker) -> DomainResult<()> {
        let salary = self
            .salary_expectation
            .map(|s| validate_non_negative("salary_expectation", s))
            .transpose()?;

        if let Some(v) = optional_text(self.prof_pic) {
            js.prof_pic = v;
        }
        if let Some(v) = self.fileupload_id {
            js.fileupload_id = Some(v);
        }
        if let Some(v) = optional_text(self.bio) {
            js.bio = v;
        }
        if let Some(v) = self.availability {
            js.availability = Some(v);
        }
        if let Some(v) = self.job_category_id {
            js.job_category_id = Some(v);
        }
        if let Some(v) = salary {
            js.salary_expectation = Some(v);
        }
        if let Some(v) = optional_text(self.work_experience) {
            js.work_experience = v;
        }
        if let Some(v) = optional_text(self.education) {
            js.education = v;
        }
        if let Some(v) = optional_text(self.skills) {
            js.skills = v;
        }
        if let Some(v) = self.verification_status {
            js.verification_status = v;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn owner_and_id_are_not_patchable() {
        for body in [json!({ "user_id": UserId::new() }), json!({ "id": JobseekerId::new() })] {
            assert!(serde_json::from_value::<JobseekerPatch>(body).is_err());
        }
    }

    #[test]
    fn values_are_type_checked() {
        assert!(serde_json::from_value::<JobseekerPatch>(json!({ "availability": "yes" })).is_err());
        assert!(serde_json::from_value::<JobseekerPatch>(json!({ "salary_expectation": "lots" })).is_err());
    }

    #[test]
    fn negative_salary_is_rejected() {
        let mut js = Jobseeker::empty(UserId::new());
        let patch = JobseekerPatch {
            salary_expectation: Some(-5.0),
            bio: Some("hi".into()),
            ..Default::default()
        };
        assert!(patch.apply_to(&mut js).is_err());
        assert_eq!(js.bio, None);
    }

    #[test]
    fn patch_updates_profile() {
        let mut js = Jobseeker::empty(UserId::new());
        let patch: JobseekerPatch = serde_json::from_value(json!({
            "bio": "Software developer with 5 years of experience.",
            "availability": true,
            "salary_expectation": 60000.0,
            "skills": "Rust, SQL"
        }))
        .unwrap();
        assert!(!patch.touches_verification());
        patch.apply_to(&mut js).unwrap();
        assert_eq!(js.availability, Some(true));
        assert_eq!(js.salary_expectation, Some(60000.0));
        assert!(!js.verification_status);
    }
}
