//! Shared patch plumbing and field validation helpers.

use jobportal_core::{DomainError, DomainResult};

/// A whitelisted partial update of a record.
///
/// Absent fields leave the record untouched. Implementations validate before
/// touching the target, so a rejected patch never half-applies.
pub trait Patch<T> {
    /// `true` if the patch changes a verification flag (admin-only).
    fn touches_verification(&self) -> bool {
        false
    }

    fn apply_to(self, target: &mut T) -> DomainResult<()>;
}

/// Trim an optional free-text field; an empty string clears the field.
pub(crate) fn optional_text(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| {
        let v = v.trim();
        if v.is_empty() { None } else { Some(v.to_string()) }
    })
}

/// Trim a required text field, rejecting empty values.
pub(crate) fn required_text(field: &str, value: &str) -> DomainResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(v.to_string())
}

pub(crate) fn validate_email(value: &str) -> DomainResult<String> {
    let email = required_text("email", value)?.to_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(DomainError::validation("invalid email format"));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}

pub(crate) fn validate_non_negative(field: &str, value: f64) -> DomainResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!("{field} must be a non-negative number")));
    }
    Ok(value)
}
