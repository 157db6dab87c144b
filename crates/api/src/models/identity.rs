//! Authenticated identity and session domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use design_library_core::{Email, Role, UserId};

/// The caller behind a valid session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Profile ID.
    pub id: UserId,
    /// Normalized email address.
    pub email: Email,
    /// Name shown in the web app, if the user set one.
    pub display_name: Option<String>,
    /// Authorization role.
    pub role: Role,
}

impl Identity {
    /// Returns `true` if this identity may use routes gated on `required`.
    #[must_use]
    pub fn has_role(&self, required: Role) -> bool {
        self.role.satisfies(required)
    }
}

/// Fields for creating a profile.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub email: Email,
    pub display_name: Option<String>,
    pub role: Role,
}

/// A stored session (the token itself is never stored).
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// SHA-256 of the bearer token, lowercase hex.
    pub token_hash: String,
    /// Owner of the session.
    pub user_id: UserId,
    /// When the session was issued.
    pub created_at: DateTime<Utc>,
    /// When the session stops being accepted. `None` never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Last time the token authenticated a request.
    pub last_used_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Returns `true` if the session is still accepted at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires| expires > now)
    }
}
