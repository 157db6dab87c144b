//! Bearer-token session commands.
//!
//! Tokens are printed exactly once; only their SHA-256 is stored.

use chrono::{DateTime, Duration, Utc};
use design_library_api::config;
use design_library_api::services::auth::{generate_session_token, hash_token};
use design_library_core::Email;

use super::CliError;

/// `--ttl-hours` when given, otherwise the API's `SESSION_TTL_HOURS` setting.
fn ttl_hours<F>(flag: Option<i64>, lookup: F) -> Result<i64, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let hours = match flag {
        Some(hours) => hours,
        None => config::session_ttl_hours(lookup)?,
    };
    if hours < 1 {
        return Err(CliError::InvalidTtl(hours));
    }
    Ok(hours)
}

fn expires_at(now: DateTime<Utc>, hours: i64) -> Result<DateTime<Utc>, CliError> {
    Duration::try_hours(hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or(CliError::InvalidTtl(hours))
}

/// Issue a token for a profile and print it.
pub async fn issue(email: &str, ttl_flag: Option<i64>) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let repo = super::identities().await?;
    let hours = ttl_hours(ttl_flag, |key| std::env::var(key).ok())?;

    let identity = repo
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CliError::UserNotFound(email.to_string()))?;

    let token = generate_session_token();
    let session = repo
        .create_session(identity.id, &hash_token(&token), Some(expires_at(Utc::now(), hours)?))
        .await?;

    tracing::info!(
        "Session issued for {} ({}), expires {}",
        identity.email,
        identity.role,
        session
            .expires_at
            .map_or_else(|| "never".to_owned(), |at| at.to_rfc3339())
    );
    tracing::info!("The token is shown once and cannot be recovered:");

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }

    Ok(())
}

/// Revoke every token of a profile.
pub async fn revoke(email: &str) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let repo = super::identities().await?;

    let identity = repo
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CliError::UserNotFound(email.to_string()))?;

    let revoked = repo.revoke_all_for_user(identity.id).await?;
    tracing::info!("Revoked {} session(s) for {}", revoked, identity.email);

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn env(ttl: Option<&'static str>) -> impl Fn(&str) -> Option<String> {
        move |key| (key == "SESSION_TTL_HOURS").then_some(ttl).flatten().map(str::to_string)
    }

    #[test]
    fn explicit_ttl_wins_and_must_be_positive() {
        assert_eq!(ttl_hours(Some(24), env(Some("48"))).unwrap(), 24);
        assert!(matches!(ttl_hours(Some(0), env(None)), Err(CliError::InvalidTtl(0))));
        assert!(matches!(ttl_hours(Some(-5), env(None)), Err(CliError::InvalidTtl(-5))));
    }

    #[test]
    fn ttl_falls_back_to_api_setting() {
        assert_eq!(ttl_hours(None, env(Some("48"))).unwrap(), 48);
        assert_eq!(ttl_hours(None, env(None)).unwrap(), 720);
        assert!(matches!(
            ttl_hours(None, env(Some("forever"))),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn expiry_is_now_plus_ttl() {
        let now = Utc::now();
        assert_eq!(expires_at(now, 720).unwrap(), now + Duration::days(30));
        assert!(expires_at(now, i64::MAX).is_err());
    }
}
