use serde::{Deserialize, Serialize};

use jobportal_core::{DomainError, DomainResult, Entity, JobCategoryId};

use crate::patch::required_text;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobCategory {
    pub id: JobCategoryId,
    pub category_name: String,
}

impl JobCategory {
    pub fn named(name: &str) -> DomainResult<Self> {
        Ok(Self { id: JobCategoryId::new(), category_name: required_text("category_name", name)? })
    }
}

impl Entity for JobCategory {
    type Id = JobCategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewJobCategory {
    pub category_name: Option<String>,
}

impl NewJobCategory {
    pub fn into_category(self) -> DomainResult<JobCategory> {
        let name = self.category_name.ok_or_else(|| DomainError::missing_field("category_name"))?;
        JobCategory::named(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_name_is_required() {
        assert!(NewJobCategory::default().into_category().is_err());
        assert!(JobCategory::named("   ").is_err());
        assert_eq!(JobCategory::named(" Sales ").unwrap().category_name, "Sales");
    }
}
