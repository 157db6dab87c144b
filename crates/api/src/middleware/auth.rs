//! Authentication extractors.
//!
//! Each extractor resolves the bearer token against the identity store. A
//! failed store lookup rejects with a 500; it never degrades to anonymous.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn admin_only(RequireAdmin(session): RequireAdmin) -> impl IntoResponse {
//!     format!("Hello, {}!", session.identity.email)
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::Span;

use design_library_core::Role;

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::{self, AuthSession};
use crate::state::AppState;

async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<AuthSession>, AppError> {
    let session = auth::resolve_identity(&state.backends().identities, &parts.headers).await?;

    if let Some(session) = &session {
        Span::current().record("user_id", tracing::field::display(session.identity.id));
        set_sentry_user(&session.identity.id, Some(session.identity.email.as_str()));
    }

    Ok(session)
}

/// Extractor that requires an authenticated caller (401 otherwise).
pub struct RequireAuth(pub AuthSession);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = auth::require_identity(resolve(parts, state).await?)?;
        Ok(Self(session))
    }
}

/// Extractor that requires an `admin` or `super_admin` caller.
///
/// Rejects with 401 when unauthenticated and 403 when the role is too low.
pub struct RequireAdmin(pub AuthSession);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = auth::require_identity(resolve(parts, state).await?)?;
        auth::require_role(&session.identity, Role::Admin)?;
        Ok(Self(session))
    }
}
