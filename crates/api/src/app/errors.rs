use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use jobportal_auth::{AuthError, AuthzError, PasswordError};
use jobportal_core::DomainError;
use jobportal_infra::StoreError;

/// Every failure a handler can return, rendered as
/// `{ "error": <code>, "message": <text> }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required fields")]
    MissingField(String),

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but role or ownership does not permit the operation.
    #[error("You don't have access!")]
    Forbidden,

    #[error("Pay fee to have access!")]
    Paywall,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Details are logged, never returned.
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::InvalidCredentials | ApiError::Forbidden => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Paywall => StatusCode::PAYMENT_REQUIRED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingField(_) => "missing_field",
            ApiError::Validation(_) => "validation_error",
            ApiError::Unauthorized => "unauthorized",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Forbidden => "forbidden",
            ApiError::Paywall => "payment_required",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(detail = %detail, "request failed");
        }
        json_error(self.status(), self.code(), self.to_string())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::MissingField(f) => ApiError::MissingField(f),
            DomainError::Validation(m) | DomainError::InvariantViolation(m) | DomainError::InvalidId(m) => {
                ApiError::Validation(m)
            }
            DomainError::NotFound => ApiError::not_found("record"),
            DomainError::Conflict(m) => ApiError::Conflict(m),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => ApiError::Unauthorized,
            AuthzError::Forbidden(_) => ApiError::Forbidden,
            AuthzError::Paywall => ApiError::Paywall,
        }
    }
}

/// A rejected credential is a 401; a broken session store is a 500.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(e) => ApiError::Internal(e.to_string()),
            AuthError::MissingCredential
            | AuthError::WrongCredentialKind
            | AuthError::UnknownSession
            | AuthError::InvalidToken(_) => ApiError::Unauthorized,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Conflict(what) => ApiError::Conflict(what),
            StoreError::Backend(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobportal_auth::DenyReason;

    #[test]
    fn policy_outcomes_map_to_statuses() {
        assert_eq!(ApiError::from(AuthzError::Unauthenticated).status(), StatusCode::UNAUTHORIZED);
        let forbidden = ApiError::from(AuthzError::Forbidden(DenyReason::NotOwner));
        assert_eq!(forbidden.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(forbidden.to_string(), "You don't have access!");
        let paywall = ApiError::from(AuthzError::Paywall);
        assert_eq!(paywall.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(paywall.to_string(), "Pay fee to have access!");
    }

    #[test]
    fn store_failures_do_not_leak_details() {
        let err = ApiError::from(StoreError::backend("connection refused to 10.0.0.5"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("10.0.0.5"));
    }

    #[test]
    fn credential_failures_split_between_401_and_500() {
        assert_eq!(ApiError::from(AuthError::UnknownSession).status(), StatusCode::UNAUTHORIZED);
        let broken = ApiError::from(AuthError::Store(jobportal_auth::SessionStoreError("lock poisoned".into())));
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!broken.to_string().contains("poisoned"));
    }

    #[test]
    fn missing_fields_message() {
        let err = ApiError::from(DomainError::missing_field("email"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Missing required fields");
    }
}
