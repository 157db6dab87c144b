//! Account roles used for authorization.

use serde::{Deserialize, Serialize};

/// Error returned when a role string is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected one of: user, admin, super_admin)")]
pub struct RoleError(pub String);

/// Role attached to an authenticated identity.
///
/// Roles are ordered: `User < Admin < SuperAdmin`. A route that requires a
/// role accepts that role and every role above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular member: browse, download, buy, read own notifications.
    #[default]
    User,
    /// Admin console access: templates, import jobs, queue status.
    Admin,
    /// Admin console access plus account management.
    SuperAdmin,
}

impl Role {
    /// Returns `true` if this role grants at least the access of `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }

    /// Returns `true` for `Admin` and `SuperAdmin`.
    #[must_use]
    pub fn is_admin(self) -> bool {
        self.satisfies(Self::Admin)
    }

    /// The string stored in the database and used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(RoleError(other.to_owned())),
        }
    }
}
