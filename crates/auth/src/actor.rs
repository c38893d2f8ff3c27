use serde::Serialize;

use jobportal_core::UserId;

use crate::Role;

/// A fully resolved actor for authorization decisions.
///
/// Built per request by the transport layer from the credential's identity plus
/// the current state of the actor's own profile. Never stored between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
    /// Whether the actor's own employer profile has paid to view jobseekers.
    /// Always false for non-employers.
    pub pay_to_view: bool,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            pay_to_view: false,
        }
    }

    pub fn with_pay_to_view(mut self, pay_to_view: bool) -> Self {
        self.pay_to_view = matches!(self.role, Role::Employer) && pay_to_view;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
