//! Integration tests for the design library API.
//!
//! The full router is driven in-process with `tower::ServiceExt::oneshot`.
//! Every backend is an in-memory fake that counts calls, so tests can assert
//! that a rejected request never reached the database, Stripe or the queue.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p design-library-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;

use design_library_api::config::AppConfig;
use design_library_api::db::memory::InMemoryStore;
use design_library_api::models::Identity;
use design_library_api::services::auth::{generate_session_token, hash_token};
use design_library_api::services::queue::mock::MockJobQueue;
use design_library_api::services::stripe::mock::MockPaymentProcessor;
use design_library_api::services::JobQueue;
use design_library_api::state::{AppState, Backends};
use design_library_core::{Email, Role, UserId};

/// Secret that passes the placeholder and entropy checks.
const TEST_STRIPE_KEY: &str = "sk_test_4eC39HqLyjWDarjtT1zdp7dcYb2Mn8QxLp5Rw0Ks";

/// Environment the test server is configured from.
#[must_use]
pub fn test_env() -> HashMap<&'static str, String> {
    HashMap::from([
        (
            "API_DATABASE_URL",
            "postgres://localhost:5432/design_library_test".to_string(),
        ),
        ("APP_BASE_URL", "https://designs.test".to_string()),
        ("STRIPE_SECRET_KEY", TEST_STRIPE_KEY.to_string()),
    ])
}

/// A running app plus handles on its fake backends.
pub struct TestContext {
    pub app: Router,
    pub store: Arc<InMemoryStore>,
    pub payments: Arc<MockPaymentProcessor>,
    pub queue: Option<Arc<MockJobQueue>>,
}

impl TestContext {
    /// App configured from [`test_env`], without a queue.
    #[must_use]
    pub fn new() -> Self {
        Self::from_env(&test_env(), false)
    }

    /// App with a mock queue attached.
    #[must_use]
    pub fn with_queue() -> Self {
        let mut env = test_env();
        env.insert("QUEUE_API_URL", "https://queue.test/v1".to_string());
        env.insert("QUEUE_API_TOKEN", "qt_9fK2mXr7LpQ4vN8sZ1wB6yT3".to_string());
        Self::from_env(&env, true)
    }

    /// App configured from an explicit environment.
    #[must_use]
    pub fn from_env(env: &HashMap<&'static str, String>, with_queue: bool) -> Self {
        let config = AppConfig::from_lookup(|key| env.get(key).cloned())
            .expect("test environment is valid");

        let store = Arc::new(InMemoryStore::new());
        let payments = Arc::new(MockPaymentProcessor::new());
        let queue = with_queue.then(|| Arc::new(MockJobQueue::new()));

        let backends = Backends::in_memory(
            &store,
            payments.clone(),
            queue.clone().map(|q| q as Arc<dyn JobQueue>),
        );
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost:5432/design_library_test")
            .expect("invalid database url");

        Self {
            app: design_library_api::app(AppState::with_backends(config, pool, backends)),
            store,
            payments,
            queue,
        }
    }

    /// Register a profile with `role` and return it with a bearer token.
    #[must_use]
    pub fn login(&self, role: Role) -> (Identity, String) {
        let id = UserId::random();
        let identity = Identity {
            id,
            email: Email::parse(&format!("{}@example.com", id.as_uuid().simple())).unwrap(),
            display_name: None,
            role,
        };
        let token = generate_session_token();
        self.store.insert_identity(identity.clone(), &hash_token(&token));
        (identity, token)
    }

    pub async fn send(
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
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: serde_json::Value) -> Response {
        self.send(Method::POST, uri, token, Some(body)).await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Assert the status and parse the body as JSON, printing the body on mismatch.
pub async fn json_body(resp: Response, expected: StatusCode) -> serde_json::Value {
    let actual = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(
        actual,
        expected,
        "unexpected status, body: {}",
        String::from_utf8_lossy(&bytes)
    );
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}
