use maintrack_auth::{PublicUser, Role};
use maintrack_core::UserId;

/// Authenticated caller for a request, taken verbatim from the verified token.
///
/// The user record is not re-read, so a role change only takes effect once
/// the caller obtains a new token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user: PublicUser,
}

impl PrincipalContext {
    pub fn new(user: PublicUser) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn user(&self) -> &PublicUser {
        &self.user
    }

    pub fn into_user(self) -> PublicUser {
        self.user
    }
}
