//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! dl-cli migrate
//! ```
//!
//! Migrations live in `crates/api/migrations/` and are embedded at compile
//! time. The API server never applies them itself.
//!
//! ```text
//! migrations/
//! ├── 20261001000001_create_profiles_and_sessions.sql
//! ├── 20261001000002_create_catalog.sql
//! └── ...
//! ```

use super::CliError;

/// Apply every pending migration.
pub async fn run() -> Result<(), CliError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
