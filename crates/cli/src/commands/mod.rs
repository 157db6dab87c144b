//! CLI command implementations.

pub mod migrate;
pub mod session;
pub mod user;

use design_library_api::config::ConfigError;
use design_library_api::db::{IdentityRepository, RepositoryError};
use design_library_core::{EmailError, RoleError};
use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// API configuration value is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Invalid role.
    #[error(transparent)]
    InvalidRole(#[from] RoleError),

    /// Invalid email.
    #[error(transparent)]
    InvalidEmail(#[from] EmailError),

    /// Profile already exists.
    #[error("Profile already exists with email: {0}")]
    UserExists(String),

    /// Profile does not exist.
    #[error("No profile with email: {0}")]
    UserNotFound(String),

    /// Token lifetime out of range.
    #[error("ttl-hours must be at least 1, got {0}")]
    InvalidTtl(i64),
}

/// Read the database URL, preferring `API_DATABASE_URL` over `DATABASE_URL`.
fn database_url() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();

    std::env::var("API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("API_DATABASE_URL"))
}

/// Connect to the database.
async fn connect() -> Result<PgPool, CliError> {
    use secrecy::ExposeSecret;

    let database_url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}

/// Connect and wrap the pool in the profile/session repository.
async fn identities() -> Result<IdentityRepository, CliError> {
    Ok(IdentityRepository::new(connect().await?))
}
