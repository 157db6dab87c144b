//! Bearer-token authentication.
//!
//! Tokens are 32 random bytes, hex-encoded. The database only ever sees the
//! SHA-256 of a token. Resolution fails closed: a store error is an internal
//! error, never an anonymous request.

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use rand::RngCore;
use sha2::{Digest, Sha256};

use design_library_core::Role;

use crate::db::{IdentityStore, RepositoryError};
use crate::error::AppError;
use crate::models::Identity;

/// Upper bound on the length of a presented token. Anything longer is not one of ours.
const MAX_TOKEN_LEN: usize = 256;

/// A request's resolved session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Owner of the session.
    pub identity: Identity,
    /// SHA-256 of the presented token, used to revoke it.
    pub token_hash: String,
}

/// Generates a cryptographically random session token (64 hex chars = 32 bytes).
#[must_use]
pub fn generate_session_token() -> String {
    let mut buf = [0u8; 32];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Returns the SHA-256 hex digest of the given token.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively. Missing, non-ASCII, empty or
/// oversized values yield `None`.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty() && token.len() <= MAX_TOKEN_LEN).then_some(token)
}

/// Resolve the caller behind a request's bearer token.
///
/// Returns `Ok(None)` for missing, malformed, unknown or expired tokens.
/// On success the session's last-used timestamp is updated in the
/// background; that update never fails the request.
///
/// # Errors
///
/// Returns `RepositoryError` if the session lookup itself fails.
pub async fn resolve_identity(
    store: &Arc<dyn IdentityStore>,
    headers: &HeaderMap,
) -> Result<Option<AuthSession>, RepositoryError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };
    let token_hash = hash_token(token);

    let Some(identity) = store.find_by_token_hash(&token_hash).await? else {
        tracing::debug!("bearer token did not match an active session");
        return Ok(None);
    };

    // Fire-and-forget: update last_used_at
    let store = Arc::clone(store);
    let hash = token_hash.clone();
    tokio::spawn(async move {
        if let Err(e) = store.touch_session(&hash).await {
            tracing::warn!(error = %e, "failed to update session last_used_at");
        }
    });

    Ok(Some(AuthSession {
        identity,
        token_hash,
    }))
}

/// Fail with 401 when no session was resolved.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when `session` is `None`.
pub fn require_identity(session: Option<AuthSession>) -> Result<AuthSession, AppError> {
    session.ok_or_else(AppError::unauthenticated)
}

/// Fail with 403 when `identity` is below `required`.
///
/// # Errors
///
/// Returns `AppError::Forbidden` when the role check fails.
pub fn require_role(identity: &Identity, required: Role) -> Result<(), AppError> {
    if identity.has_role(required) {
        Ok(())
    } else {
        tracing::info!(
            user_id = %identity.id,
            role = %identity.role,
            required = %required,
            "Role check failed"
        );
        Err(AppError::forbidden())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use std::collections::HashSet;

    use super::*;
    use crate::db::memory::InMemoryStore;
    use axum::http::HeaderValue;
    use design_library_core::{Email, UserId};

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn identity(role: Role) -> Identity {
        Identity {
            id: UserId::random(),
            email: Email::parse("maker@example.com").unwrap(),
            display_name: None,
            role,
        }
    }

    #[test]
    fn generated_tokens_are_64_lowercase_hex_and_distinct() {
        let tokens: Vec<String> = (0..128).map(|_| generate_session_token()).collect();
        for token in &tokens {
            assert_eq!(token.len(), 64);
            assert!(
                token
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
            );
        }
        let unique: HashSet<&String> = tokens.iter().collect();
        assert_eq!(unique.len(), tokens.len());
    }

    #[test]
    fn hash_token_is_deterministic_sha256() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("Basic abc123")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers(&format!("Bearer {}", "a".repeat(300)))), None);
    }

    #[tokio::test]
    async fn resolve_identity_known_and_unknown_tokens() {
        let memory = Arc::new(InMemoryStore::new());
        let user = identity(Role::User);
        let token = generate_session_token();
        memory.insert_identity(user.clone(), &hash_token(&token));
        let store: Arc<dyn IdentityStore> = memory.clone();

        let session = resolve_identity(&store, &headers(&format!("Bearer {token}")))
            .await
            .unwrap()
            .expect("session");
        assert_eq!(session.identity, user);
        assert_eq!(session.token_hash, hash_token(&token));

        let unknown = resolve_identity(&store, &headers("Bearer not-a-session"))
            .await
            .unwrap();
        assert!(unknown.is_none());

        let missing = resolve_identity(&store, &HeaderMap::new()).await.unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn require_helpers() {
        assert!(matches!(
            require_identity(None),
            Err(AppError::Unauthorized(_))
        ));

        assert!(require_role(&identity(Role::Admin), Role::Admin).is_ok());
        assert!(require_role(&identity(Role::SuperAdmin), Role::Admin).is_ok());
        assert!(matches!(
            require_role(&identity(Role::User), Role::Admin),
            Err(AppError::Forbidden(_))
        ));
    }
}
