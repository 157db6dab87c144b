//! Database access for the API.
//!
//! # Database schema: `app`
//!
//! ## Tables
//!
//! - `profile` - Users of the web app with their role
//! - `session` - SHA-256 hashes of bearer tokens issued to profiles
//! - `notification` - In-app notifications
//! - `email_template` - Editable transactional email templates
//! - `import_job` / `import_log` - Written by the design ingestion pipeline
//! - `design` / `download` - Design catalog and per-user download history
//! - `tier` - Membership tiers with their Stripe price IDs
//!
//! Each feature has a store trait (used by handlers through [`crate::state::Backends`])
//! and a `PostgreSQL` repository implementing it. [`memory::InMemoryStore`]
//! implements every trait for tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p design-library-cli -- migrate
//! ```

pub mod downloads;
pub mod email_templates;
pub mod identities;
pub mod imports;
pub mod memory;
pub mod notifications;
pub mod tiers;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use downloads::{DownloadRepository, DownloadStore};
pub use email_templates::{EmailTemplateRepository, EmailTemplateStore};
pub use identities::{IdentityRepository, IdentityStore};
pub use imports::{ImportRepository, ImportStore};
pub use notifications::{NotificationRepository, NotificationStore};
pub use tiers::{TierRepository, TierStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// One page of a list query plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Convert a `COUNT(*)` result, which Postgres returns as `BIGINT`.
pub(crate) fn count_to_u64(count: i64) -> Result<u64, RepositoryError> {
    u64::try_from(count)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative row count: {count}")))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
