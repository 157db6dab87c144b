//! Integration tests for authentication and role gating.
//!
//! Rejected requests must never reach a delegate: the in-memory store counts
//! data calls separately from session lookups, and the payment and queue
//! fakes count every call.

use axum::http::{Method, StatusCode};
use serde_json::json;

use design_library_core::Role;
use design_library_integration_tests::{TestContext, json_body};

const USER_ROUTES: &[(Method, &str)] = &[
    (Method::GET, "/api/me"),
    (Method::GET, "/api/me/downloads"),
    (Method::DELETE, "/api/auth/session"),
    (Method::GET, "/api/notifications"),
    (Method::POST, "/api/notifications"),
    (Method::POST, "/api/notifications/read-all"),
];

const ADMIN_ROUTES: &[&str] = &[
    "/api/admin/email/templates",
    "/api/admin/email/templates/welcome",
    "/api/admin/import/jobs",
    "/api/admin/import/jobs/00000000-0000-4000-8000-000000000001",
    "/api/admin/import/jobs/00000000-0000-4000-8000-000000000001/logs",
    "/api/admin/import/jobs/00000000-0000-4000-8000-000000000001/logs/reasons",
    "/api/admin/jobs/42",
];

// =============================================================================
// Unauthenticated
// =============================================================================

#[tokio::test]
async fn test_anonymous_requests_are_401_without_delegate_calls() {
    let ctx = TestContext::with_queue();

    for (method, uri) in USER_ROUTES {
        let body = (*method == Method::POST)
            .then(|| json!({ "ids": ["00000000-0000-4000-8000-000000000001"] }));
        let resp = ctx.send(method.clone(), uri, None, body).await;
        let body = json_body(resp, StatusCode::UNAUTHORIZED).await;
        assert_eq!(body["error"], "Unauthorized", "{method} {uri}");
    }
    for uri in ADMIN_ROUTES {
        let resp = ctx.get(uri, None).await;
        json_body(resp, StatusCode::UNAUTHORIZED).await;
    }

    let resp = ctx
        .post(
            "/api/stripe/checkout",
            None,
            json!({ "tier_id": "00000000-0000-4000-8000-000000000001", "price_type": "yearly" }),
        )
        .await;
    json_body(resp, StatusCode::UNAUTHORIZED).await;

    assert_eq!(ctx.store.data_calls(), 0);
    assert_eq!(ctx.payments.call_count(), 0);
    assert_eq!(ctx.queue.as_ref().unwrap().call_count(), 0);
}

#[tokio::test]
async fn test_malformed_authorization_headers_are_anonymous() {
    let ctx = TestContext::new();
    ctx.login(Role::Admin);

    for header in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer    ", "Token abc"] {
        let resp = axum::http::Request::builder()
            .uri("/api/me")
            .header("authorization", header)
            .body(axum::body::Body::empty())
            .unwrap();
        let resp = tower::ServiceExt::oneshot(ctx.app.clone(), resp).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{header}");
    }
}

#[tokio::test]
async fn test_expired_session_is_401() {
    use chrono::{Duration, Utc};
    use design_library_api::models::SessionRecord;
    use design_library_api::services::auth::{generate_session_token, hash_token};

    let ctx = TestContext::new();
    let (identity, _) = ctx.login(Role::Admin);
    let stale = generate_session_token();
    ctx.store.insert_session(SessionRecord {
        token_hash: hash_token(&stale),
        user_id: identity.id,
        created_at: Utc::now() - Duration::days(31),
        expires_at: Some(Utc::now() - Duration::days(1)),
        last_used_at: None,
    });

    let resp = ctx.get("/api/admin/import/jobs", Some(&stale)).await;
    json_body(resp, StatusCode::UNAUTHORIZED).await;
    assert_eq!(ctx.store.data_calls(), 0);
}

// =============================================================================
// Role gating
// =============================================================================

#[tokio::test]
async fn test_regular_user_gets_403_on_every_admin_route() {
    let ctx = TestContext::with_queue();
    let (_, token) = ctx.login(Role::User);

    for uri in ADMIN_ROUTES {
        let resp = ctx.get(uri, Some(&token)).await;
        let body = json_body(resp, StatusCode::FORBIDDEN).await;
        assert_eq!(body["error"], "Forbidden", "{uri}");
    }

    assert_eq!(ctx.store.data_calls(), 0);
    assert_eq!(ctx.queue.as_ref().unwrap().call_count(), 0);
}

#[tokio::test]
async fn test_admin_and_super_admin_pass_role_gate() {
    let ctx = TestContext::new();

    for role in [Role::Admin, Role::SuperAdmin] {
        let (_, token) = ctx.login(role);
        let resp = ctx.get("/api/admin/import/jobs", Some(&token)).await;
        let body = json_body(resp, StatusCode::OK).await;
        assert_eq!(body["total"], 0);
    }
}

#[tokio::test]
async fn test_revoked_session_cannot_be_reused() {
    let ctx = TestContext::new();
    let (_, token) = ctx.login(Role::Admin);

    let resp = ctx
        .send(Method::DELETE, "/api/auth/session", Some(&token), None)
        .await;
    json_body(resp, StatusCode::OK).await;

    let resp = ctx.get("/api/admin/email/templates", Some(&token)).await;
    json_body(resp, StatusCode::UNAUTHORIZED).await;
}
