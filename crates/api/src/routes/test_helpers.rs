//! Shared test utilities for route handler tests.
//!
//! Imported in each route module's `#[cfg(test)]` block via
//! `use crate::routes::test_helpers::*;`

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc, clippy::panic)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use chrono::Utc;
use http_body_util::BodyExt;
use secrecy::SecretString;
use tower::ServiceExt;
use url::Url;

use design_library_core::{Email, Role, UserId};

use crate::config::{AppConfig, LogFormat, StripeConfig};
use crate::db::memory::InMemoryStore;
use crate::models::Identity;
use crate::services::auth::{generate_session_token, hash_token};
use crate::services::queue::mock::MockJobQueue;
use crate::services::stripe::mock::MockPaymentProcessor;
use crate::state::{AppState, Backends};

/// Configuration pointing at nothing; the pool is never connected.
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: SecretString::from("postgres://localhost:5432/design_library_test"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: Url::parse("https://designs.test").unwrap(),
        max_page_size: 100,
        stripe: StripeConfig {
            secret_key: SecretString::from("sk_test_unused"),
            api_base: Url::parse("http://127.0.0.1:9").unwrap(),
        },
        queue: None,
        log_format: LogFormat::Text,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Router plus handles on every fake backend.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub payments: Arc<MockPaymentProcessor>,
    pub queue: Option<Arc<MockJobQueue>>,
    pub app: Router,
}

impl Harness {
    /// Harness without a queue configured.
    pub fn new() -> Self {
        Self::build(test_config(), false)
    }

    /// Harness with a mock queue configured.
    pub fn with_queue() -> Self {
        Self::build(test_config(), true)
    }

    fn build(config: AppConfig, with_queue: bool) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let payments = Arc::new(MockPaymentProcessor::new());
        let queue = with_queue.then(|| Arc::new(MockJobQueue::new()));

        let backends = Backends::in_memory(
            &store,
            payments.clone(),
            queue.clone().map(|q| q as Arc<dyn crate::services::JobQueue>),
        );
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost:5432/design_library_test")
            .expect("invalid database url");
        let state = AppState::with_backends(config, pool, backends);

        Self {
            store,
            payments,
            queue,
            app: crate::app(state),
        }
    }

    /// Register an identity with `role` and return `(identity, bearer token)`.
    pub fn login(&self, role: Role) -> (Identity, String) {
        let identity = Identity {
            id: UserId::random(),
            email: Email::parse(&format!("{}@example.com", role.as_str().replace('_', "-")))
                .unwrap(),
            display_name: Some(format!("Test {role}")),
            role,
        };
        let token = generate_session_token();
        self.store.insert_identity(identity.clone(), &hash_token(&token));
        (identity, token)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: serde_json::Value) -> Response {
        self.request(Method::POST, uri, token, Some(body)).await
    }
}

/// Assert an HTTP response has the expected status code and return the body.
///
/// On failure, reads and prints the response body so test output shows the error.
pub async fn assert_status(resp: Response, expected: StatusCode) -> Bytes {
    let actual = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    if actual != expected {
        let body_str = String::from_utf8_lossy(&body);
        panic!(
            "assertion `left == right` failed\n  left: {actual}\n right: {expected}\n  body: {body_str}"
        );
    }
    body
}

/// Assert the status and parse the body as JSON.
pub async fn assert_json(resp: Response, expected: StatusCode) -> serde_json::Value {
    let body = assert_status(resp, expected).await;
    serde_json::from_slice(&body).expect("response body is not JSON")
}

/// A timestamp `minutes` ago.
pub fn minutes_ago(minutes: i64) -> chrono::DateTime<Utc> {
    Utc::now() - chrono::Duration::minutes(minutes)
}
