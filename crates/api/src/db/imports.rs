//! Import job repository (read-only).
//!
//! The ingestion pipeline owns `import_job` and `import_log`; the admin
//! console only pages through them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use design_library_core::{
    DesignId, ImportJobId, ImportJobStatus, ImportLogId, ImportLogStatus, Page, UserId,
};

use super::{Paged, RepositoryError};
use crate::models::{ImportJob, ImportLog, ImportLogFacets, ImportLogFilter};

/// Import job reads used by the admin console.
#[async_trait]
pub trait ImportStore: Send + Sync {
    /// One page of jobs, newest first.
    async fn list_jobs(&self, page: Page) -> Result<Paged<ImportJob>, RepositoryError>;

    /// A job by ID.
    async fn get_job(&self, id: ImportJobId) -> Result<Option<ImportJob>, RepositoryError>;

    /// One page of a job's logs matching `filter`, in processing order.
    async fn list_logs(
        &self,
        job_id: ImportJobId,
        filter: &ImportLogFilter,
        page: Page,
    ) -> Result<Paged<ImportLog>, RepositoryError>;

    /// Distinct reasons and file types present in a job's logs.
    async fn log_facets(&self, job_id: ImportJobId) -> Result<ImportLogFacets, RepositoryError>;
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ImportJobRow {
    id: ImportJobId,
    status: String,
    source_path: String,
    total_files: i64,
    processed_files: i64,
    skipped_files: i64,
    failed_files: i64,
    created_by: Option<UserId>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<ImportJobRow> for ImportJob {
    type Error = RepositoryError;

    fn try_from(row: ImportJobRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ImportJobStatus>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: row.id,
            status,
            source_path: row.source_path,
            total_files: row.total_files,
            processed_files: row.processed_files,
            skipped_files: row.skipped_files,
            failed_files: row.failed_files,
            created_by: row.created_by,
            error_message: row.error_message,
            created_at: row.created_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ImportLogRow {
    id: ImportLogId,
    job_id: ImportJobId,
    file_path: String,
    file_type: Option<String>,
    status: String,
    reason: Option<String>,
    design_id: Option<DesignId>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ImportLogRow> for ImportLog {
    type Error = RepositoryError;

    fn try_from(row: ImportLogRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ImportLogStatus>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: row.id,
            job_id: row.job_id,
            file_path: row.file_path,
            file_type: row.file_type,
            status,
            reason: row.reason,
            design_id: row.design_id,
            created_at: row.created_at,
        })
    }
}

const JOB_COLUMNS: &str = "id, status, source_path, total_files, processed_files, \
     skipped_files, failed_files, created_by, error_message, created_at, started_at, completed_at";

// Unset filters are bound as NULL and match every row.
const LOG_FILTER: &str = "job_id = $1 \
     AND ($2::text IS NULL OR status = $2) \
     AND ($3::text IS NULL OR reason = $3) \
     AND ($4::text IS NULL OR file_type = $4)";

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` import job repository.
#[derive(Clone)]
pub struct ImportRepository {
    pool: PgPool,
}

impl ImportRepository {
    /// Create a new import repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImportStore for ImportRepository {
    async fn list_jobs(&self, page: Page) -> Result<Paged<ImportJob>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM app.import_job")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ImportJobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM app.import_job \
             ORDER BY created_at DESC, id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paged {
            items: rows
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
            total: super::count_to_u64(total)?,
        })
    }

    async fn get_job(&self, id: ImportJobId) -> Result<Option<ImportJob>, RepositoryError> {
        let row = sqlx::query_as::<_, ImportJobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM app.import_job WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_logs(
        &self,
        job_id: ImportJobId,
        filter: &ImportLogFilter,
        page: Page,
    ) -> Result<Paged<ImportLog>, RepositoryError> {
        let status = filter.status.map(ImportLogStatus::as_str);

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM app.import_log WHERE {LOG_FILTER}"))
                .bind(job_id)
                .bind(status)
                .bind(filter.reason.as_deref())
                .bind(filter.file_type.as_deref())
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, ImportLogRow>(&format!(
            "SELECT id, job_id, file_path, file_type, status, reason, design_id, created_at \
             FROM app.import_log WHERE {LOG_FILTER} \
             ORDER BY created_at, id LIMIT $5 OFFSET $6"
        ))
        .bind(job_id)
        .bind(status)
        .bind(filter.reason.as_deref())
        .bind(filter.file_type.as_deref())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paged {
            items: rows
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
            total: super::count_to_u64(total)?,
        })
    }

    async fn log_facets(&self, job_id: ImportJobId) -> Result<ImportLogFacets, RepositoryError> {
        let reasons: Vec<String> = sqlx::query_scalar(
            r"
            SELECT DISTINCT reason
            FROM app.import_log
            WHERE job_id = $1 AND reason IS NOT NULL AND reason <> ''
            ORDER BY reason
            ",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        let file_types: Vec<String> = sqlx::query_scalar(
            r"
            SELECT DISTINCT file_type
            FROM app.import_log
            WHERE job_id = $1 AND file_type IS NOT NULL AND file_type <> ''
            ORDER BY file_type
            ",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ImportLogFacets {
            reasons,
            file_types,
        })
    }
}
