//! Email template browsing.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::extract::ApiPath;
use crate::middleware::RequireAdmin;
use crate::models::EmailTemplate;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ListResponse {
    success: bool,
    templates: Vec<EmailTemplate>,
}

#[derive(Debug, Serialize)]
pub struct ShowResponse {
    success: bool,
    template: EmailTemplate,
}

/// `GET /api/admin/email/templates`
pub async fn list(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ListResponse>> {
    let templates = state.backends().templates.list().await?;

    Ok(Json(ListResponse {
        success: true,
        templates: templates.into_iter().map(EmailTemplate::from).collect(),
    }))
}

/// `GET /api/admin/email/templates/{key}`
pub async fn show(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
) -> Result<Json<ShowResponse>> {
    let template = state
        .backends()
        .templates
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("Template not found".to_string()))?;

    Ok(Json(ShowResponse {
        success: true,
        template: template.into(),
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use axum::http::StatusCode;
    use chrono::Utc;

    use design_library_core::Role;

    use crate::models::EmailTemplateRecord;
    use crate::routes::test_helpers::*;

    fn record(key: &str) -> EmailTemplateRecord {
        EmailTemplateRecord {
            key: key.to_string(),
            name: key.replace('_', " "),
            subject: "Hello {{user_name}}".to_string(),
            body: "<p>Hi {{user_name}}</p>".to_string(),
            description: None,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn list_attaches_variables_sorted_by_key() {
        let harness = Harness::new();
        let (_, token) = harness.login(Role::Admin);
        harness.store.insert_template(record("welcome"));
        harness.store.insert_template(record("password_reset"));

        let resp = harness.get("/api/admin/email/templates", Some(&token)).await;
        let json = assert_json(resp, StatusCode::OK).await;
        assert_eq!(json["success"], true);
        let templates = json["templates"].as_array().unwrap();
        assert_eq!(templates[0]["key"], "password_reset");
        assert_eq!(templates[0]["variables"][1]["name"], "reset_url");
        assert_eq!(templates[1]["key"], "welcome");
    }

    #[tokio::test]
    async fn show_known_and_unknown() {
        let harness = Harness::new();
        let (_, token) = harness.login(Role::SuperAdmin);
        harness.store.insert_template(record("download_ready"));

        let resp = harness
            .get("/api/admin/email/templates/download_ready", Some(&token))
            .await;
        let json = assert_json(resp, StatusCode::OK).await;
        assert_eq!(json["template"]["key"], "download_ready");

        let resp = harness
            .get("/api/admin/email/templates/nope", Some(&token))
            .await;
        let json = assert_json(resp, StatusCode::NOT_FOUND).await;
        assert_eq!(json["error"], "Template not found");
    }

    #[tokio::test]
    async fn regular_user_gets_403_without_data_access() {
        let harness = Harness::new();
        let (_, token) = harness.login(Role::User);
        harness.store.insert_template(record("welcome"));

        for uri in [
            "/api/admin/email/templates",
            "/api/admin/email/templates/welcome",
        ] {
            let resp = harness.get(uri, Some(&token)).await;
            let json = assert_json(resp, StatusCode::FORBIDDEN).await;
            assert_eq!(json["error"], "Forbidden");
        }
        assert_eq!(harness.store.data_calls(), 0);
    }

    #[tokio::test]
    async fn anonymous_gets_401() {
        let harness = Harness::new();
        let resp = harness.get("/api/admin/email/templates", None).await;
        assert_status(resp, StatusCode::UNAUTHORIZED).await;
        assert_eq!(harness.store.data_calls(), 0);
    }
}
