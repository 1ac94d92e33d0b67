use chrono::{DateTime, Utc};

/// Request context for one authenticated user.
///
/// Only `AuthService::authenticate` hands these out. The presentation layer
/// owns the session and passes `username()` into every ledger call; the
/// services never keep a "current user" of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    username: String,
    authenticated_at: DateTime<Utc>,
}

impl Session {
    pub(super) fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            authenticated_at: Utc::now(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn authenticated_at(&self) -> DateTime<Utc> {
        self.authenticated_at
    }
}
