//! Queue job status.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::extract::ApiPath;
use crate::middleware::RequireAdmin;
use crate::services::JobSnapshot;
use crate::services::queue::is_valid_job_id;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct JobResponse {
    job: JobSnapshot,
}

/// `GET /api/admin/jobs/{job_id}`
pub async fn show(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(job_id): ApiPath<String>,
) -> Result<Json<JobResponse>> {
    let Some(queue) = state.backends().queue.as_ref() else {
        return Err(AppError::ServiceUnavailable(
            "Job queue is not configured".to_string(),
        ));
    };

    if !is_valid_job_id(&job_id) {
        return Err(AppError::BadRequest("Invalid job id".to_string()));
    }

    let job = queue
        .job(&job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    Ok(Json(JobResponse { job }))
}
