use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use axum::http::StatusCode;

    use crate::routes::test_helpers::*;

    #[tokio::test]
    async fn health_always_returns_200() {
        let harness = Harness::new();
        let resp = harness.get("/health", None).await;
        let body = assert_status(resp, StatusCode::OK).await;
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn health_response_carries_request_id_and_security_headers() {
        let harness = Harness::new();
        let resp = harness.get("/health", None).await;
        assert!(resp.headers().contains_key("x-request-id"));
        assert_eq!(resp.headers().get("x-content-type-options").unwrap(), "nosniff");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let harness = Harness::new();
        let resp = harness.get("/api/nope", None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
