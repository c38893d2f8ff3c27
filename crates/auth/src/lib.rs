//! `jobportal-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: credentials come
//! in as strings, identities and decisions go out as plain values.

pub mod actor;
pub mod claims;
pub mod identity;
pub mod password;
pub mod policy;
pub mod roles;
pub mod session;
pub mod token;

pub use actor::Actor;
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use identity::{
    AuthError, Credential, Identity, IdentityProvider, IssuedCredential, SessionIdentityProvider,
    TokenIdentityProvider,
};
pub use password::{PasswordError, hash_password, verify_password};
pub use policy::{
    AuthzError, Decision, DecisionExplanation, DenyReason, Operation, Resource, ResourceKind,
    authorize, can_view, explain,
};
pub use roles::{Role, UnknownRole};
pub use session::{
    InMemorySessionStore, SessionId, SessionRecord, SessionStore, SessionStoreError, SessionStoreResult,
};
pub use token::{Hs256Jwt, JwtValidator};
