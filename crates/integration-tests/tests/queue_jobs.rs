//! Integration tests for the queue job status endpoint.

use axum::http::StatusCode;

use design_library_api::services::JobSnapshot;
use design_library_core::{QueueJobState, Role};
use design_library_integration_tests::{TestContext, json_body};

#[tokio::test]
async fn test_unconfigured_queue_is_503_for_admins() {
    let ctx = TestContext::new();
    let (_, token) = ctx.login(Role::Admin);

    let resp = ctx.get("/api/admin/jobs/import-123", Some(&token)).await;
    json_body(resp, StatusCode::SERVICE_UNAVAILABLE).await;
}

#[tokio::test]
async fn test_unconfigured_queue_still_checks_role_first() {
    let ctx = TestContext::new();
    let (_, token) = ctx.login(Role::User);

    let resp = ctx.get("/api/admin/jobs/import-123", Some(&token)).await;
    json_body(resp, StatusCode::FORBIDDEN).await;
}

#[tokio::test]
async fn test_failed_job_snapshot() {
    let ctx = TestContext::with_queue();
    let (_, token) = ctx.login(Role::SuperAdmin);
    let queue = ctx.queue.as_ref().unwrap();
    queue.insert(JobSnapshot {
        id: "import-123".to_string(),
        name: "bulk-import".to_string(),
        state: QueueJobState::Failed,
        progress: 100,
        attempts_made: 3,
        failed_reason: Some("source path not mounted".to_string()),
        return_value: None,
        created_at: None,
        processed_at: None,
        finished_at: None,
    });

    let resp = ctx.get("/api/admin/jobs/import-123", Some(&token)).await;
    let body = json_body(resp, StatusCode::OK).await;
    assert_eq!(body["job"]["state"], "failed");
    assert_eq!(body["job"]["failed_reason"], "source path not mounted");
    assert_eq!(queue.call_count(), 1);

    let resp = ctx.get("/api/admin/jobs/import-999", Some(&token)).await;
    json_body(resp, StatusCode::NOT_FOUND).await;
}
