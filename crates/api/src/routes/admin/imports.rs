//! Import job browsing.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use design_library_core::{ImportJobId, ImportLogStatus, PageRequest, saturating_i64};

use crate::error::{AppError, Result};
use crate::extract::{ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{ImportJob, ImportLog, ImportLogFacets, ImportLogFilter};
use crate::routes::PageMeta;
use crate::state::AppState;

const JOBS_PAGE_SIZE: u32 = 20;
const LOGS_PAGE_SIZE: u32 = 50;

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    jobs: Vec<ImportJob>,
    #[serde(flatten)]
    page: PageMeta,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    job: ImportJob,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    logs: Vec<ImportLog>,
    #[serde(flatten)]
    page: PageMeta,
}

/// Query string of the log listing. Empty values count as unset.
#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    status: Option<String>,
    reason: Option<String>,
    file_type: Option<String>,
    #[serde(default, deserialize_with = "saturating_i64")]
    page: Option<i64>,
    #[serde(
        rename = "pageSize",
        alias = "page_size",
        default,
        deserialize_with = "saturating_i64"
    )]
    page_size: Option<i64>,
}

impl LogsQuery {
    fn filter(&self) -> Result<ImportLogFilter> {
        let status = non_empty(self.status.as_deref())
            .map(str::parse::<ImportLogStatus>)
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(ImportLogFilter {
            status,
            reason: non_empty(self.reason.as_deref()).map(str::to_string),
            file_type: non_empty(self.file_type.as_deref()).map(str::to_string),
        })
    }

    const fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

async fn existing_job(state: &AppState, job_id: ImportJobId) -> Result<ImportJob> {
    state
        .backends()
        .imports
        .get_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Import job not found".to_string()))
}

/// `GET /api/admin/import/jobs`
pub async fn list_jobs(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    ApiQuery(request): ApiQuery<PageRequest>,
) -> Result<Json<JobsResponse>> {
    let page = request.resolve(JOBS_PAGE_SIZE, state.config().max_page_size);
    let paged = state.backends().imports.list_jobs(page).await?;

    Ok(Json(JobsResponse {
        jobs: paged.items,
        page: PageMeta::new(page, paged.total),
    }))
}

/// `GET /api/admin/import/jobs/{job_id}`
pub async fn show_job(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(job_id): ApiPath<ImportJobId>,
) -> Result<Json<JobResponse>> {
    let job = existing_job(&state, job_id).await?;
    Ok(Json(JobResponse { job }))
}

/// `GET /api/admin/import/jobs/{job_id}/logs`
pub async fn list_logs(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(job_id): ApiPath<ImportJobId>,
    ApiQuery(query): ApiQuery<LogsQuery>,
) -> Result<Json<LogsResponse>> {
    let filter = query.filter()?;
    let page = query
        .page_request()
        .resolve(LOGS_PAGE_SIZE, state.config().max_page_size);

    existing_job(&state, job_id).await?;
    let paged = state
        .backends()
        .imports
        .list_logs(job_id, &filter, page)
        .await?;

    Ok(Json(LogsResponse {
        logs: paged.items,
        page: PageMeta::new(page, paged.total),
    }))
}

/// `GET /api/admin/import/jobs/{job_id}/logs/reasons`
pub async fn log_reasons(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(job_id): ApiPath<ImportJobId>,
) -> Result<Json<ImportLogFacets>> {
    existing_job(&state, job_id).await?;
    let facets = state.backends().imports.log_facets(job_id).await?;
    Ok(Json(facets))
}
