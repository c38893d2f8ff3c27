//! Identity providers: resolve an inbound credential to a user identity.
//!
//! Two interchangeable variants: server-side sessions (cookie) and stateless
//! bearer tokens (JWT). The transport layer extracts the raw credential and the
//! provider does the rest.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use jobportal_core::UserId;

use crate::{
    Hs256Jwt, JwtClaims, JwtValidator, Role, SessionId, SessionRecord, SessionStore, SessionStoreError,
    TokenValidationError,
};

/// Raw credential presented with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    SessionCookie(SessionId),
    Bearer(String),
}

/// Credential handed back to the client after signup/login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuedCredential {
    Session(SessionId),
    Token(String),
}

/// Who the credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no credential presented")]
    MissingCredential,

    #[error("credential of the wrong kind for this provider")]
    WrongCredentialKind,

    #[error("unknown or expired session")]
    UnknownSession,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenValidationError),

    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, credential: &Credential, now: DateTime<Utc>) -> Result<Identity, AuthError>;
    fn issue(&self, identity: Identity, now: DateTime<Utc>) -> Result<IssuedCredential, AuthError>;
    /// Invalidate a credential. Stateless providers treat this as a no-op.
    fn revoke(&self, credential: &Credential) -> Result<(), AuthError>;
    /// Invalidate every credential of a user that the provider can track.
    fn revoke_user(&self, user_id: UserId) -> Result<(), AuthError>;
}

/// Session-cookie identity provider backed by a [`SessionStore`].
///
/// Sessions live for `ttl` from creation. Expired sessions are dropped when
/// presented, and all of them are swept whenever a new session is issued.
#[derive(Clone)]
pub struct SessionIdentityProvider {
    sessions: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionIdentityProvider {
    pub fn new(sessions: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { sessions, ttl }
    }
}

impl IdentityProvider for SessionIdentityProvider {
    fn resolve(&self, credential: &Credential, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let Credential::SessionCookie(id) = credential else {
            return Err(AuthError::WrongCredentialKind);
        };
        let record = self.sessions.get(id)?.ok_or(AuthError::UnknownSession)?;
        if now >= record.created_at + self.ttl {
            self.sessions.remove(id)?;
            return Err(AuthError::UnknownSession);
        }
        Ok(Identity {
            user_id: record.user_id,
            role: record.role,
        })
    }

    fn issue(&self, identity: Identity, now: DateTime<Utc>) -> Result<IssuedCredential, AuthError> {
        let expired = self.sessions.remove_created_before(now - self.ttl)?;
        if expired > 0 {
            tracing::debug!(expired, "swept expired sessions");
        }

        let id = SessionId::generate();
        self.sessions.insert(
            id.clone(),
            SessionRecord {
                user_id: identity.user_id,
                role: identity.role,
                created_at: now,
            },
        )?;
        Ok(IssuedCredential::Session(id))
    }

    fn revoke(&self, credential: &Credential) -> Result<(), AuthError> {
        if let Credential::SessionCookie(id) = credential {
            self.sessions.remove(id)?;
        }
        Ok(())
    }

    fn revoke_user(&self, user_id: UserId) -> Result<(), AuthError> {
        let removed = self.sessions.remove_user(user_id)?;
        tracing::debug!(%user_id, removed, "revoked user sessions");
        Ok(())
    }
}

/// Stateless bearer-token identity provider.
#[derive(Debug, Clone)]
pub struct TokenIdentityProvider {
    jwt: Hs256Jwt,
    ttl: Duration,
}

impl TokenIdentityProvider {
    pub fn new(jwt: Hs256Jwt, ttl: Duration) -> Self {
        Self { jwt, ttl }
    }
}

impl IdentityProvider for TokenIdentityProvider {
    fn resolve(&self, credential: &Credential, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let Credential::Bearer(token) = credential else {
            return Err(AuthError::WrongCredentialKind);
        };
        let claims = self.jwt.validate(token, now)?;
        Ok(Identity {
            user_id: claims.sub,
            role: claims.role,
        })
    }

    fn issue(&self, identity: Identity, now: DateTime<Utc>) -> Result<IssuedCredential, AuthError> {
        let claims = JwtClaims::new(identity.user_id, identity.role, now, self.ttl);
        Ok(IssuedCredential::Token(self.jwt.issue(&claims)?))
    }

    fn revoke(&self, _credential: &Credential) -> Result<(), AuthError> {
        Ok(())
    }

    fn revoke_user(&self, _user_id: UserId) -> Result<(), AuthError> {
        Ok(())
    }
}
