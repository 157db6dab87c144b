//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                   - Liveness
//! GET    /health/ready                             - Readiness (database)
//!
//! # Account (requires auth)
//! GET    /api/me                                   - Current identity
//! GET    /api/me/downloads                         - Download history (paged, max 50)
//! DELETE /api/auth/session                         - Revoke the presented token
//!
//! # Notifications (requires auth)
//! GET    /api/notifications                        - List (?unread, ?limit)
//! POST   /api/notifications                        - Mark ids read
//! POST   /api/notifications/read-all               - Mark everything read
//!
//! # Billing (requires auth)
//! POST   /api/stripe/checkout                      - Create a Checkout Session
//!
//! # Admin console (requires admin)
//! GET    /api/admin/email/templates                - List templates
//! GET    /api/admin/email/templates/{key}          - One template
//! GET    /api/admin/import/jobs                    - Import jobs (paged)
//! GET    /api/admin/import/jobs/{jobId}            - One import job
//! GET    /api/admin/import/jobs/{jobId}/logs       - Per-file logs (filtered, paged)
//! GET    /api/admin/import/jobs/{jobId}/logs/reasons - Distinct reasons and file types
//! GET    /api/admin/jobs/{jobId}                   - Queue job status
//! ```

pub mod admin;
pub mod auth;
pub mod health;
pub mod me;
pub mod notifications;
pub mod stripe;

#[cfg(test)]
pub(crate) mod test_helpers;

use axum::{
    Router,
    routing::{delete, get, post},
};
use serde::Serialize;

use design_library_core::Page;

use crate::state::AppState;

/// Create the account routes router.
pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(me::show))
        .route("/downloads", get(me::downloads))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list).post(notifications::mark_read))
        .route("/read-all", post(notifications::mark_all_read))
}

/// Create the admin console routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/email/templates", get(admin::email_templates::list))
        .route("/email/templates/{key}", get(admin::email_templates::show))
        .route("/import/jobs", get(admin::imports::list_jobs))
        .route("/import/jobs/{job_id}", get(admin::imports::show_job))
        .route("/import/jobs/{job_id}/logs", get(admin::imports::list_logs))
        .route(
            "/import/jobs/{job_id}/logs/reasons",
            get(admin::imports::log_reasons),
        )
        .route("/jobs/{job_id}", get(admin::jobs::show))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/me", me_routes())
        .route("/api/auth/session", delete(auth::revoke_session))
        .nest("/api/notifications", notification_routes())
        .route("/api/stripe/checkout", post(stripe::checkout))
        .nest("/api/admin", admin_routes())
}

/// Pagination fields shared by every paged response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl PageMeta {
    #[must_use]
    pub fn new(page: Page, total: u64) -> Self {
        Self {
            page: page.page,
            page_size: page.page_size,
            total,
            total_pages: page.total_pages(total),
        }
    }
}
