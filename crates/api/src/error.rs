//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Each error collapses into one
//! of a fixed set of [`ErrorKind`]s, which decides the HTTP status and the
//! message a client may see. Responses are always `{"error": "<message>"}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::queue::QueueError;
use crate::services::stripe::PaymentError;

/// Client-visible error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    NotFound,
    BadRequest,
    ServiceUnavailable,
    InternalError,
}

impl ErrorKind {
    /// HTTP status for this kind.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message used when no more specific one is supplied.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Unauthenticated => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::BadRequest => "Bad request",
            Self::ServiceUnavailable => "Service unavailable",
            Self::InternalError => "Internal server error",
        }
    }
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Stripe API operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Managed queue API operation failed.
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A backing service is not configured or not reachable.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// 401 with the default message.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::Unauthorized(ErrorKind::Unauthenticated.default_message().to_string())
    }

    /// 403 with the default message.
    #[must_use]
    pub fn forbidden() -> Self {
        Self::Forbidden(ErrorKind::Forbidden.default_message().to_string())
    }

    /// 404 with the default message.
    #[must_use]
    pub fn not_found() -> Self {
        Self::NotFound(ErrorKind::NotFound.default_message().to_string())
    }

    /// The category this error falls into.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Database(RepositoryError::NotFound) => ErrorKind::NotFound,
            Self::Database(_) | Self::Payment(_) | Self::Queue(_) | Self::Internal(_) => {
                ErrorKind::InternalError
            }
            Self::Unauthorized(_) => ErrorKind::Unauthenticated,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
        }
    }

    /// The message sent to the client. Server-side details are never exposed.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::ServiceUnavailable(msg)
                if !msg.is_empty() =>
            {
                msg.clone()
            }
            _ => self.kind().default_message().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();

        // Capture server errors to Sentry
        if kind == ErrorKind::InternalError {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if kind == ErrorKind::ServiceUnavailable {
            tracing::warn!(error = %self, "Backing service unavailable");
        }

        (kind.status(), Json(json!({ "error": self.client_message() }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("template welcome".to_string());
        assert_eq!(err.to_string(), "Not found: template welcome");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[tokio::test]
    async fn test_vocabulary_defaults() {
        let cases = [
            (AppError::unauthenticated(), 401, "Unauthorized"),
            (AppError::forbidden(), 403, "Forbidden"),
            (AppError::not_found(), 404, "Not found"),
            (AppError::BadRequest(String::new()), 400, "Bad request"),
            (
                AppError::ServiceUnavailable(String::new()),
                503,
                "Service unavailable",
            ),
            (
                AppError::Internal("x".to_string()),
                500,
                "Internal server error",
            ),
        ];

        for (err, status, message) in cases {
            let (got_status, body) = render(err).await;
            assert_eq!(got_status.as_u16(), status);
            assert_eq!(body["error"], message);
        }
    }

    #[tokio::test]
    async fn test_client_message_is_kept_for_client_errors() {
        let (status, body) = render(AppError::BadRequest(
            "price_type must be one of: yearly, lifetime".to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "price_type must be one of: yearly, lifetime");
    }

    #[tokio::test]
    async fn test_internal_details_are_not_leaked() {
        let (status, body) = render(AppError::Internal(
            "connection refused at 10.0.0.3:5432".to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");

        let (status, body) = render(AppError::Database(RepositoryError::DataCorruption(
            "invalid role 'root' for user 42".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_payment_and_queue_failures_are_internal() {
        let (status, _) = render(AppError::Payment(PaymentError::Api {
            status: 402,
            message: "card_declined".to_string(),
        }))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, body) = render(AppError::Queue(QueueError::Parse(
            "expected value at line 1".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        assert_eq!(
            AppError::Database(RepositoryError::NotFound).kind(),
            ErrorKind::NotFound
        );
    }
}
