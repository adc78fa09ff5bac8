use rogerbank_core::UserId;

/// Identity established by the auth middleware for a request.
///
/// Present on every `/api/bank` route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: UserId,
}

impl AuthenticatedUser {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
