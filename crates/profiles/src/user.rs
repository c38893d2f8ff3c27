//! User accounts and admin profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobportal_auth::Role;
use jobportal_core::{AdminId, DomainError, DomainResult, Entity, UserId};

use crate::patch::{Patch, optional_text, required_text, validate_email};

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A user account.
///
/// # Invariants
/// - `role` is fixed at signup (no patch field exists for it).
/// - Admin accounts are verified from the start; others start unverified.
/// - `password_hash` never leaves the process (skipped on serialization).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub phone_number: Option<String>,
    pub role: Role,
    pub verified: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Signup payload.
///
/// Fields are optional at the type level so that a missing field surfaces as
/// `MissingField` rather than a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub first_name: Option<String>,
    #[serde(alias = "sir_name")]
    pub surname: Option<String>,
    pub phone_number: Option<String>,
}

impl NewUser {
    /// Check required fields, returning `(email, password, role)`.
    pub fn required(&self) -> DomainResult<(String, String, Role)> {
        let (Some(email), Some(password), Some(role)) = (
            present(&self.email),
            self.password.as_deref().filter(|p| !p.is_empty()),
            present(&self.role),
        ) else {
            return Err(DomainError::missing_field("email, password and role are required"));
        };

        let role: Role = role
            .parse()
            .map_err(|e: jobportal_auth::UnknownRole| DomainError::validation(e.to_string()))?;

        Ok((validate_email(email)?, password.to_string(), role))
    }

    /// Build the account. `password_hash` must already be hashed.
    pub fn into_user(self, password_hash: String, now: DateTime<Utc>) -> DomainResult<User> {
        let (email, _password, role) = self.required()?;

        let username = match self.username.as_deref() {
            Some(u) => required_text("username", u)?,
            None => email.clone(),
        };

        Ok(User {
            id: UserId::new(),
            username,
            email,
            first_name: optional_text(self.first_name).flatten(),
            surname: optional_text(self.surname).flatten(),
            phone_number: optional_text(self.phone_number).flatten(),
            role,
            verified: role == Role::Admin,
            password_hash,
            created_at: now,
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Fields of a user account a client may change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    #[serde(alias = "sir_name")]
    pub surname: Option<String>,
    pub phone_number: Option<String>,
    /// Admin-only.
    pub verified: Option<bool>,
}

impl Patch<User> for UserPatch {
    fn touches_verification(&self) -> bool {
        self.verified.is_some()
    }

    fn apply_to(self, user: &mut User) -> DomainResult<()> {
        let username = self.username.as_deref().map(|u| required_text("username", u)).transpose()?;
        let email = self.email.as_deref().map(validate_email).transpose()?;

        if let Some(username) = username {
            user.username = username;
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(v) = optional_text(self.first_name) {
            user.first_name = v;
        }
        if let Some(v) = optional_text(self.surname) {
            user.surname = v;
        }
        if let Some(v) = optional_text(self.phone_number) {
            user.phone_number = v;
        }
        if let Some(verified) = self.verified {
            user.verified = verified;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Admin
// ─────────────────────────────────────────────────────────────────────────────

/// Admin profile, created alongside an admin account at signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admin {
    pub id: AdminId,
    pub user_id: UserId,
}

impl Admin {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            id: AdminId::new(),
            user_id,
        }
    }
}

impl Entity for Admin {
    type Id = AdminId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(role: &str) -> NewUser {
        NewUser {
            username: Some("Samuel Smith".into()),
            email: Some("SamuelSmith@gmail.com".into()),
            password: Some("password1".into()),
            role: Some(role.into()),
            ..Default::default()
        }
    }

    #[test]
    fn admin_signup_is_verified_immediately() {
        let user = signup("admin").into_user("hash".into(), Utc::now()).unwrap();
        assert!(user.verified);
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn other_roles_start_unverified() {
        for role in ["jobseeker", "employer"] {
            let user = signup(role).into_user("hash".into(), Utc::now()).unwrap();
            assert!(!user.verified, "{role} should start unverified");
        }
    }

    #[test]
    fn missing_fields_are_reported() {
        let mut s = signup("employer");
        s.password = None;
        assert!(matches!(s.required(), Err(DomainError::MissingField(_))));

        let mut s = signup("employer");
        s.email = Some("   ".into());
        assert!(matches!(s.required(), Err(DomainError::MissingField(_))));
    }

    #[test]
    fn unknown_role_is_a_validation_error() {
        assert!(matches!(signup("recruiter").required(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn username_defaults_to_email() {
        let mut s = signup("jobseeker");
        s.username = None;
        let user = s.into_user("hash".into(), Utc::now()).unwrap();
        assert_eq!(user.username, "samuelsmith@gmail.com");
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = signup("jobseeker").into_user("secret-hash".into(), Utc::now()).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "jobseeker");
    }

    #[test]
    fn patch_rejects_role_and_unknown_keys() {
        let err = serde_json::from_value::<UserPatch>(serde_json::json!({ "role": "admin" }));
        assert!(err.is_err());
        let err = serde_json::from_value::<UserPatch>(serde_json::json!({ "password_hash": "x" }));
        assert!(err.is_err());
    }

    #[test]
    fn patch_applies_whitelisted_fields() {
        let mut user = signup("jobseeker").into_user("hash".into(), Utc::now()).unwrap();
        let patch: UserPatch =
            serde_json::from_value(serde_json::json!({ "sir_name": "Smith", "first_name": " Sam " })).unwrap();
        assert!(!patch.touches_verification());
        patch.apply_to(&mut user).unwrap();
        assert_eq!(user.surname.as_deref(), Some("Smith"));
        assert_eq!(user.first_name.as_deref(), Some("Sam"));
    }

    #[test]
    fn invalid_patch_does_not_half_apply() {
        let mut user = signup("jobseeker").into_user("hash".into(), Utc::now()).unwrap();
        let before = user.clone();
        let patch = UserPatch {
            username: Some("new-name".into()),
            email: Some("broken".into()),
            ..Default::default()
        };
        assert!(patch.apply_to(&mut user).is_err());
        assert_eq!(user, before);
    }
}
