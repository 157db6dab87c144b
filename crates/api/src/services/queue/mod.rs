//! Managed job queue REST client.
//!
//! Background work (preview rendering, metadata extraction, bulk imports)
//! runs in a hosted queue. The admin console only reads job status:
//! `GET {QUEUE_API_URL}/jobs/{id}` with a bearer token.

pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use design_library_core::QueueJobState;

use crate::config::QueueConfig;

/// Timeout for every queue request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest job ID accepted before contacting the queue.
const MAX_JOB_ID_LEN: usize = 128;

/// Errors that can occur when interacting with the queue API.
#[derive(Debug, Error)]
pub enum QueueError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Point-in-time view of a queue job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub id: String,
    pub name: String,
    pub state: QueueJobState,
    /// Percent complete, 0 to 100.
    pub progress: u8,
    pub attempts_made: u32,
    pub failed_reason: Option<String>,
    pub return_value: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Queue operations used by the admin console.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Fetch a job's status. `Ok(None)` when the queue does not know the ID.
    async fn job(&self, job_id: &str) -> Result<Option<JobSnapshot>, QueueError>;
}

/// Returns `true` if `job_id` looks like an ID the queue could have issued.
#[must_use]
pub fn is_valid_job_id(job_id: &str) -> bool {
    !job_id.is_empty()
        && job_id.len() <= MAX_JOB_ID_LEN
        && job_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        && job_id != "."
        && job_id != ".."
}

// =============================================================================
// Wire format
// =============================================================================

/// Job as returned by the queue API. Timestamps are epoch milliseconds.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobPayload {
    id: serde_json::Value,
    #[serde(default)]
    name: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    progress: serde_json::Value,
    #[serde(default)]
    attempts_made: u32,
    failed_reason: Option<String>,
    #[serde(alias = "returnvalue")]
    return_value: Option<serde_json::Value>,
    timestamp: Option<i64>,
    processed_on: Option<i64>,
    finished_on: Option<i64>,
}

fn millis(value: Option<i64>) -> Option<DateTime<Utc>> {
    value.and_then(DateTime::from_timestamp_millis)
}

impl From<JobPayload> for JobSnapshot {
    fn from(payload: JobPayload) -> Self {
        let id = match payload.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        // Progress may be a number or an arbitrary object; only numbers count.
        let progress = payload
            .progress
            .as_f64()
            .map_or(0, |p| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let pct = p.clamp(0.0, 100.0).round() as u8;
                pct
            });

        Self {
            id,
            name: payload.name,
            state: payload
                .state
                .as_deref()
                .map_or(QueueJobState::Unknown, QueueJobState::parse_lenient),
            progress,
            attempts_made: payload.attempts_made,
            failed_reason: payload.failed_reason.filter(|r| !r.is_empty()),
            return_value: payload.return_value.filter(|v| !v.is_null()),
            created_at: millis(payload.timestamp),
            processed_at: millis(payload.processed_on),
            finished_at: millis(payload.finished_on),
        }
    }
}

// =============================================================================
// HTTP client
// =============================================================================

/// REST client for the managed queue.
#[derive(Clone)]
pub struct HttpJobQueue {
    client: reqwest::Client,
    api_url: Url,
    token: SecretString,
}

impl HttpJobQueue {
    /// Create a new queue client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &QueueConfig) -> Result<Self, QueueError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            token: config.token.clone(),
        })
    }

    /// `{api_url}/jobs/{job_id}` with the ID as a single encoded path segment.
    fn job_url(&self, job_id: &str) -> Result<Url, QueueError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| QueueError::Parse("queue URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("jobs")
            .push(job_id);
        Ok(url)
    }
}

#[async_trait]
impl JobQueue for HttpJobQueue {
    async fn job(&self, job_id: &str) -> Result<Option<JobSnapshot>, QueueError> {
        let url = self.job_url(job_id)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(QueueError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let payload: JobPayload = response
            .json()
            .await
            .map_err(|e| QueueError::Parse(e.to_string()))?;

        Ok(Some(payload.into()))
    }
}
