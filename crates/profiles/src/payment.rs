use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobportal_core::{DomainError, DomainResult, EmployerId, Entity, PaymentId};

/// The one-off fee that unlocks jobseeker visibility for an employer.
///
/// At most one payment exists per employer; the store enforces this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub employer_id: EmployerId,
    pub amount: f64,
    pub payment_date: DateTime<Utc>,
    pub payment_status: bool,
}

impl Entity for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Request body for `POST /payments`.
///
/// `employer_id` names the employer being paid for. When absent the caller's
/// own employer profile is used.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewPayment {
    #[serde(alias = "employerID")]
    pub employer_id: Option<EmployerId>,
    pub amount: Option<f64>,
}

impl NewPayment {
    pub fn amount(&self) -> DomainResult<f64> {
        match self.amount {
            None => Err(DomainError::missing_field("amount")),
            Some(a) if a.is_finite() && a > 0.0 => Ok(a),
            Some(_) => Err(DomainError::validation("amount must be a positive number")),
        }
    }

    pub fn into_payment(self, employer_id: EmployerId, now: DateTime<Utc>) -> DomainResult<Payment> {
        Ok(Payment {
            id: PaymentId::new(),
            employer_id,
            amount: self.amount()?,
            payment_date: now,
            payment_status: true,
        })
    }
}
