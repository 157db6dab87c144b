//! Current account routes.

use axum::{Json, extract::State};
use serde::Serialize;

use design_library_core::PageRequest;

use super::PageMeta;
use crate::error::Result;
use crate::extract::ApiQuery;
use crate::middleware::RequireAuth;
use crate::models::{Download, Identity};
use crate::state::AppState;

/// Default page size for download history.
const DOWNLOADS_PAGE_SIZE: u32 = 20;

/// Download history never returns more than this many rows per page.
const DOWNLOADS_MAX_PAGE_SIZE: u32 = 50;

/// `GET /api/me`
pub async fn show(RequireAuth(session): RequireAuth) -> Json<Identity> {
    Json(session.identity)
}

#[derive(Debug, Serialize)]
pub struct DownloadsResponse {
    downloads: Vec<Download>,
    #[serde(flatten)]
    page: PageMeta,
}

/// `GET /api/me/downloads`
pub async fn downloads(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    ApiQuery(request): ApiQuery<PageRequest>,
) -> Result<Json<DownloadsResponse>> {
    let max = DOWNLOADS_MAX_PAGE_SIZE.min(state.config().max_page_size);
    let page = request.resolve(DOWNLOADS_PAGE_SIZE, max);

    let paged = state
        .backends()
        .downloads
        .list_for_user(session.identity.id, page)
        .await?;

    Ok(Json(DownloadsResponse {
        downloads: paged.items,
        page: PageMeta::new(page, paged.total),
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use axum::http::StatusCode;
    use chrono::Utc;

    use design_library_core::{DesignId, DownloadId, Role};

    use crate::models::{Download, DownloadedDesign};
    use crate::routes::test_helpers::*;

    fn download(minutes: i64) -> Download {
        Download {
            id: DownloadId::random(),
            design: DownloadedDesign {
                id: DesignId::random(),
                title: format!("Mandala {minutes}"),
                slug: format!("mandala-{minutes}"),
                preview_path: None,
            },
            file_type: "svg".to_string(),
            created_at: Utc::now() - chrono::Duration::minutes(minutes),
        }
    }

    #[tokio::test]
    async fn me_requires_auth() {
        let harness = Harness::new();
        let resp = harness.get("/api/me", None).await;
        let json = assert_json(resp, StatusCode::UNAUTHORIZED).await;
        assert_eq!(json["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn me_returns_identity() {
        let harness = Harness::new();
        let (identity, token) = harness.login(Role::User);

        let resp = harness.get("/api/me", Some(&token)).await;
        let json = assert_json(resp, StatusCode::OK).await;
        assert_eq!(json["id"], identity.id.to_string());
        assert_eq!(json["email"], identity.email.as_str());
        assert_eq!(json["role"], "user");
    }

    #[tokio::test]
    async fn garbage_token_is_401() {
        let harness = Harness::new();
        harness.login(Role::User);
        let resp = harness.get("/api/me", Some("not-a-real-token")).await;
        assert_status(resp, StatusCode::UNAUTHORIZED).await;
    }

    #[tokio::test]
    async fn downloads_page_size_capped_at_50() {
        let harness = Harness::new();
        let (identity, token) = harness.login(Role::User);
        for minutes in 0..60 {
            harness.store.insert_download(identity.id, download(minutes));
        }

        let resp = harness
            .get("/api/me/downloads?pageSize=500", Some(&token))
            .await;
        let json = assert_json(resp, StatusCode::OK).await;
        assert_eq!(json["page_size"], 50);
        assert_eq!(json["total"], 60);
        assert_eq!(json["total_pages"], 2);
        assert_eq!(json["downloads"].as_array().unwrap().len(), 50);
        assert_eq!(json["downloads"][0]["design"]["slug"], "mandala-0");
    }

    #[tokio::test]
    async fn downloads_are_scoped_to_caller() {
        let harness = Harness::new();
        let (_, token) = harness.login(Role::User);
        harness
            .store
            .insert_download(design_library_core::UserId::random(), download(1));

        let resp = harness.get("/api/me/downloads", Some(&token)).await;
        let json = assert_json(resp, StatusCode::OK).await;
        assert_eq!(json["total"], 0);
        assert_eq!(json["total_pages"], 0);
        assert_eq!(json["page"], 1);
        assert_eq!(json["page_size"], 20);
    }

    #[tokio::test]
    async fn non_numeric_page_is_400() {
        let harness = Harness::new();
        let (_, token) = harness.login(Role::User);
        let resp = harness.get("/api/me/downloads?page=abc", Some(&token)).await;
        assert_status(resp, StatusCode::BAD_REQUEST).await;
        assert_eq!(harness.store.data_calls(), 0);
    }
}
