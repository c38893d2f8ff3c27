use serde::{Deserialize, Serialize};

use jobportal_core::{DomainResult, EmployerId, Entity, UserId};

use crate::patch::{Patch, optional_text};

/// Employer profile, owned by exactly one employer account.
///
/// # Invariants
/// - `pay_to_view` starts false and is only ever set by recording a payment
///   ([`Employer::record_payment`]); no patch field exists for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employer {
    pub id: EmployerId,
    pub user_id: UserId,
    pub company_name: Option<String>,
    pub company_profile: Option<String>,
    pub verification_status: bool,
    pub contact_details: Option<String>,
    pub pay_to_view: bool,
    pub history: Option<String>,
    pub services_offered: Option<String>,
}

impl Employer {
    pub fn empty(user_id: UserId) -> Self {
        Self {
            id: EmployerId::new(),
            user_id,
            company_name: None,
            company_profile: None,
            verification_status: false,
            contact_details: None,
            pay_to_view: false,
            history: None,
            services_offered: None,
        }
    }

    /// The sole transition that unlocks jobseeker visibility. Idempotent.
    pub fn record_payment(&mut self) {
        self.pay_to_view = true;
    }
}

impl Entity for Employer {
    type Id = EmployerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Fields of an employer profile a client may set, on create and on patch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmployerPatch {
    pub company_name: Option<String>,
    pub company_profile: Option<String>,
    pub contact_details: Option<String>,
    pub history: Option<String>,
    pub services_offered: Option<String>,
    /// Admin-only.
    pub verification_status: Option<bool>,
}

impl Patch<Employer> for EmployerPatch {
    fn touches_verification(&self) -> bool {
        self.verification_status.is_some()
    }

    fn apply_to(self, employer: &mut Employer) -> DomainResult<()> {
        if let Some(v) = optional_text(self.company_name) {
            employer.company_name = v;
        }
        if let Some(v) = optional_text(self.company_profile) {
            employer.company_profile = v;
        }
        if let Some(v) = optional_text(self.contact_details) {
            employer.contact_details = v;
        }
        if let Some(v) = optional_text(self.history) {
            employer.history = v;
        }
        if let Some(v) = optional_text(self.services_offered) {
            employer.services_offered = v;
        }
        if let Some(v) = self.verification_status {
            employer.verification_status = v;
        }
        Ok(())
    }
}
