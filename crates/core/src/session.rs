//! Per-request credential material.

/// Opaque credentials for the signed-in user.
///
/// Produced by the authentication collaborator and forwarded verbatim to
/// outgoing service calls. The runtime never inspects or refreshes it.
#[derive(Clone)]
pub struct SessionContext {
    access_token: String,
}

impl SessionContext {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}
