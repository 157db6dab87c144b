//! Notification inbox routes.

use std::collections::HashSet;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use design_library_core::{NotificationId, saturating_i64};

use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::RequireAuth;
use crate::models::Notification;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;
const MAX_IDS_PER_REQUEST: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Only return unread notifications.
    unread: Option<bool>,
    #[serde(default, deserialize_with = "saturating_i64")]
    limit: Option<i64>,
}

impl ListQuery {
    fn limit(&self) -> u32 {
        match self.limit {
            Some(limit) if limit >= 1 => u32::try_from(limit).unwrap_or(MAX_LIMIT).min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    notifications: Vec<Notification>,
    unread_count: u64,
}

/// `GET /api/notifications`
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<ListResponse>> {
    let store = &state.backends().notifications;
    let user_id = session.identity.id;

    let notifications = store
        .list_for_user(user_id, query.unread.unwrap_or(false), query.limit())
        .await?;
    let unread_count = store.count_unread(user_id).await?;

    Ok(Json(ListResponse {
        notifications,
        unread_count,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    ids: Vec<NotificationId>,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    success: bool,
    updated: u64,
}

/// `POST /api/notifications`
///
/// Marks the given notifications read. Ids owned by someone else or already
/// read are ignored and not counted.
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    ApiJson(request): ApiJson<MarkReadRequest>,
) -> Result<Json<MarkReadResponse>> {
    if request.ids.is_empty() {
        return Err(AppError::BadRequest("ids must not be empty".to_string()));
    }
    if request.ids.len() > MAX_IDS_PER_REQUEST {
        return Err(AppError::BadRequest(format!(
            "ids must hold at most {MAX_IDS_PER_REQUEST} entries"
        )));
    }

    let mut seen = HashSet::new();
    let ids: Vec<NotificationId> = request
        .ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();

    let updated = state
        .backends()
        .notifications
        .mark_read(session.identity.id, &ids)
        .await?;

    Ok(Json(MarkReadResponse {
        success: true,
        updated,
    }))
}

/// `POST /api/notifications/read-all`
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
) -> Result<Json<MarkReadResponse>> {
    let updated = state
        .backends()
        .notifications
        .mark_all_read(session.identity.id)
        .await?;

    tracing::debug!(user_id = %session.identity.id, updated, "Marked all notifications read");

    Ok(Json(MarkReadResponse {
        success: true,
        updated,
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use axum::http::StatusCode;
    use serde_json::json;

    use design_library_core::{Role, UserId};

    use super::*;
    use crate::routes::test_helpers::*;

    fn notification(user_id: UserId, read: bool, minutes: i64) -> Notification {
        Notification {
            id: NotificationId::random(),
            user_id,
            kind: "download_ready".to_string(),
            title: format!("Notification {minutes}"),
            body: Some("Your files are ready.".to_string()),
            link: Some("/account/downloads".to_string()),
            read,
            created_at: minutes_ago(minutes),
        }
    }

    #[test]
    fn limit_is_clamped() {
        let query = |limit| ListQuery {
            unread: None,
            limit,
        };
        assert_eq!(query(None).limit(), 20);
        assert_eq!(query(Some(0)).limit(), 20);
        assert_eq!(query(Some(-3)).limit(), 20);
        assert_eq!(query(Some(7)).limit(), 7);
        assert_eq!(query(Some(100)).limit(), 100);
        assert_eq!(query(Some(5000)).limit(), 100);
        assert_eq!(query(Some(i64::MAX)).limit(), 100);
    }

    #[tokio::test]
    async fn list_returns_newest_first_with_unread_count() {
        let harness = Harness::new();
        let (identity, token) = harness.login(Role::User);
        harness.store.insert_notification(notification(identity.id, true, 30));
        harness.store.insert_notification(notification(identity.id, false, 10));
        harness.store.insert_notification(notification(identity.id, false, 20));

        let resp = harness.get("/api/notifications", Some(&token)).await;
        let json = assert_json(resp, StatusCode::OK).await;
        assert_eq!(json["unread_count"], 2);
        let items = json["notifications"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["title"], "Notification 10");
        assert_eq!(items[0]["type"], "download_ready");
        assert!(items[0].get("user_id").is_none());
    }

    #[tokio::test]
    async fn list_unread_only_and_limit() {
        let harness = Harness::new();
        let (identity, token) = harness.login(Role::User);
        for minutes in 0..5 {
            harness
                .store
                .insert_notification(notification(identity.id, minutes % 2 == 0, minutes));
        }

        let resp = harness
            .get("/api/notifications?unread=true&limit=1", Some(&token))
            .await;
        let json = assert_json(resp, StatusCode::OK).await;
        let items = json["notifications"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["read"], false);
        assert_eq!(json["unread_count"], 2);
    }

    #[tokio::test]
    async fn mark_read_counts_only_own_unread() {
        let harness = Harness::new();
        let (identity, token) = harness.login(Role::User);
        let unread = notification(identity.id, false, 1);
        let already_read = notification(identity.id, true, 2);
        let foreign = notification(UserId::random(), false, 3);
        for n in [&unread, &already_read, &foreign] {
            harness.store.insert_notification(n.clone());
        }

        let resp = harness
            .post(
                "/api/notifications",
                Some(&token),
                json!({ "ids": [unread.id, unread.id, already_read.id, foreign.id] }),
            )
            .await;
        let json = assert_json(resp, StatusCode::OK).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["updated"], 1);
    }

    #[tokio::test]
    async fn mark_read_rejects_empty_and_oversized() {
        let harness = Harness::new();
        let (_, token) = harness.login(Role::User);

        let resp = harness
            .post("/api/notifications", Some(&token), json!({ "ids": [] }))
            .await;
        let json = assert_json(resp, StatusCode::BAD_REQUEST).await;
        assert_eq!(json["error"], "ids must not be empty");

        let ids: Vec<NotificationId> = (0..101).map(|_| NotificationId::random()).collect();
        let resp = harness
            .post("/api/notifications", Some(&token), json!({ "ids": ids }))
            .await;
        assert_status(resp, StatusCode::BAD_REQUEST).await;
        assert_eq!(harness.store.data_calls(), 0);
    }

    #[tokio::test]
    async fn mark_read_rejects_non_uuid() {
        let harness = Harness::new();
        let (_, token) = harness.login(Role::User);
        let resp = harness
            .post("/api/notifications", Some(&token), json!({ "ids": ["nope"] }))
            .await;
        assert_status(resp, StatusCode::BAD_REQUEST).await;
        assert_eq!(harness.store.data_calls(), 0);
    }

    #[tokio::test]
    async fn mark_all_read_then_zero_unread() {
        let harness = Harness::new();
        let (identity, token) = harness.login(Role::User);
        for minutes in 0..3 {
            harness
                .store
                .insert_notification(notification(identity.id, false, minutes));
        }

        let resp = harness
            .post("/api/notifications/read-all", Some(&token), json!({}))
            .await;
        let json = assert_json(resp, StatusCode::OK).await;
        assert_eq!(json["updated"], 3);

        let resp = harness.get("/api/notifications", Some(&token)).await;
        let json = assert_json(resp, StatusCode::OK).await;
        assert_eq!(json["unread_count"], 0);
    }

    #[tokio::test]
    async fn store_failure_is_opaque_500() {
        let harness = Harness::new();
        let (_, token) = harness.login(Role::User);
        harness.store.fail_data_calls("relation app.notification does not exist");

        let resp = harness.get("/api/notifications", Some(&token)).await;
        let json = assert_json(resp, StatusCode::INTERNAL_SERVER_ERROR).await;
        assert_eq!(json["error"], "Internal server error");
    }
}
