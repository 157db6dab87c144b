//! Profile and session repository.
//!
//! Requests authenticate with an opaque bearer token. Only the token's SHA-256
//! is stored, so a leaked `session` table cannot be replayed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use design_library_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::{Identity, NewProfile, SessionRecord};

/// Lookups the auth extractors need on every request.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Resolve a non-expired session to its owner's identity.
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Identity>, RepositoryError>;

    /// Record that a session was just used.
    async fn touch_session(&self, token_hash: &str) -> Result<(), RepositoryError>;

    /// Delete one session. Returns `true` if it existed.
    async fn revoke_session(&self, token_hash: &str) -> Result<bool, RepositoryError>;
}

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for profile queries.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: UserId,
    email: String,
    display_name: Option<String>,
    role: String,
}

impl TryFrom<ProfileRow> for Identity {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: row.id,
            email,
            display_name: row.display_name,
            role,
        })
    }
}

/// Internal row type for session queries.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    token_hash: String,
    user_id: UserId,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    last_used_at: Option<DateTime<Utc>>,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        Self {
            token_hash: row.token_hash,
            user_id: row.user_id,
            created_at: row.created_at,
            expires_at: row.expires_at,
            last_used_at: row.last_used_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for profiles and sessions.
#[derive(Clone)]
pub struct IdentityRepository {
    pool: PgPool,
}

impl IdentityRepository {
    /// Create a new identity repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a profile by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT id, email, display_name, role
            FROM app.profile
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_profile(&self, profile: &NewProfile) -> Result<Identity, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            INSERT INTO app.profile (email, display_name, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, display_name, role
            ",
        )
        .bind(profile.email.as_str())
        .bind(profile.display_name.as_deref())
        .bind(profile.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("{} already exists", profile.email))
            }
            _ => RepositoryError::Database(e),
        })?;

        row.try_into()
    }

    /// Change a profile's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile has this email.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_role(&self, email: &Email, role: Role) -> Result<Identity, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            UPDATE app.profile
            SET role = $2, updated_at = now()
            WHERE email = $1
            RETURNING id, email, display_name, role
            ",
        )
        .bind(email.as_str())
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Store a new session for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_session(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<SessionRecord, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"
            INSERT INTO app.session (token_hash, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token_hash, user_id, created_at, expires_at, last_used_at
            ",
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Delete every session belonging to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn revoke_all_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM app.session WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl IdentityStore for IdentityRepository {
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT p.id, p.email, p.display_name, p.role
            FROM app.session s
            JOIN app.profile p ON p.id = s.user_id
            WHERE s.token_hash = $1
              AND (s.expires_at IS NULL OR s.expires_at > now())
            ",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn touch_session(&self, token_hash: &str) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE app.session SET last_used_at = now() WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn revoke_session(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM app.session WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(email: &str, role: &str) -> ProfileRow {
        ProfileRow {
            id: UserId::random(),
            email: email.to_string(),
            display_name: None,
            role: role.to_string(),
        }
    }

    #[test]
    fn test_profile_row_converts() {
        let identity = Identity::try_from(row("Maker@Example.com", "super_admin")).unwrap();
        assert_eq!(identity.email.as_str(), "maker@example.com");
        assert_eq!(identity.role, Role::SuperAdmin);
    }

    #[test]
    fn test_corrupt_profile_row_is_rejected() {
        assert!(matches!(
            Identity::try_from(row("maker@example.com", "root")),
            Err(RepositoryError::DataCorruption(_))
        ));
        assert!(matches!(
            Identity::try_from(row("not-an-email", "user")),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
