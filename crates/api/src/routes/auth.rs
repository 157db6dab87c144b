//! Session management routes.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::error::{Result, clear_sentry_user};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// `DELETE /api/auth/session`
///
/// Revokes the token presented with this request. Other sessions of the
/// same user stay valid.
pub async fn revoke_session(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
) -> Result<Json<Value>> {
    state
        .backends()
        .identities
        .revoke_session(&session.token_hash)
        .await?;

    tracing::info!(user_id = %session.identity.id, "Session revoked");
    clear_sentry_user();

    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use axum::http::{Method, StatusCode};

    use design_library_core::Role;

    use crate::routes::test_helpers::*;
    use crate::services::auth::hash_token;

    #[tokio::test]
    async fn revoked_token_stops_working() {
        let harness = Harness::new();
        let (_, token) = harness.login(Role::User);

        let resp = harness
            .request(Method::DELETE, "/api/auth/session", Some(&token), None)
            .await;
        let json = assert_json(resp, StatusCode::OK).await;
        assert_eq!(json["success"], true);
        assert!(harness.store.session(&hash_token(&token)).is_none());

        let resp = harness.get("/api/me", Some(&token)).await;
        assert_status(resp, StatusCode::UNAUTHORIZED).await;
    }

    #[tokio::test]
    async fn revoke_leaves_other_sessions() {
        let harness = Harness::new();
        let (_, mine) = harness.login(Role::User);
        let (_, other) = harness.login(Role::Admin);

        let resp = harness
            .request(Method::DELETE, "/api/auth/session", Some(&mine), None)
            .await;
        assert_status(resp, StatusCode::OK).await;
        assert!(harness.store.session(&hash_token(&other)).is_some());
    }

    #[tokio::test]
    async fn revoke_requires_auth() {
        let harness = Harness::new();
        let resp = harness
            .request(Method::DELETE, "/api/auth/session", None, None)
            .await;
        assert_status(resp, StatusCode::UNAUTHORIZED).await;
    }
}
