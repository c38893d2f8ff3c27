use jobportal_auth::{Actor, Credential};
use jobportal_core::UserId;

/// Per-request authentication context, inserted by the auth middleware.
///
/// Rebuilt from the store on every request so role and `pay_to_view` are
/// current; never cached across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    actor: Actor,
    credential: Credential,
}

impl RequestContext {
    pub fn new(actor: Actor, credential: Credential) -> Self {
        Self { actor, credential }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn user_id(&self) -> UserId {
        self.actor.user_id
    }

    /// The credential the request authenticated with (needed for logout).
    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}
