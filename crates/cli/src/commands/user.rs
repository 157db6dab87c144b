//! Profile management commands.

use design_library_api::db::RepositoryError;
use design_library_api::models::NewProfile;
use design_library_core::{Email, Role};

use super::CliError;

/// Create a new profile.
pub async fn create(email: &str, name: Option<&str>, role: &str) -> Result<(), CliError> {
    let role: Role = role.parse()?;
    let email = Email::parse(email)?;
    let repo = super::identities().await?;

    tracing::info!("Creating profile: {} ({})", email, role);

    let profile = NewProfile {
        email: email.clone(),
        display_name: name.map(str::to_owned),
        role,
    };
    let identity = repo.create_profile(&profile).await.map_err(|e| match e {
        RepositoryError::Conflict(_) => CliError::UserExists(email.to_string()),
        other => other.into(),
    })?;

    tracing::info!(
        "Profile created successfully! ID: {}, Email: {}, Role: {}",
        identity.id,
        identity.email,
        identity.role
    );
    tracing::info!("Issue a token with: dl-cli session issue -e {}", identity.email);

    Ok(())
}

/// Change the role of an existing profile.
pub async fn set_role(email: &str, role: &str) -> Result<(), CliError> {
    let role: Role = role.parse()?;
    let email = Email::parse(email)?;
    let repo = super::identities().await?;

    let identity = repo.set_role(&email, role).await.map_err(|e| match e {
        RepositoryError::NotFound => CliError::UserNotFound(email.to_string()),
        other => other.into(),
    })?;

    tracing::info!("Role of {} is now {}", identity.email, identity.role);
    Ok(())
}
