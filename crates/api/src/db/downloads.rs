//! Download history repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use design_library_core::{DesignId, DownloadId, Page, UserId};

use super::{Paged, RepositoryError};
use crate::models::{Download, DownloadedDesign};

/// Download history reads.
#[async_trait]
pub trait DownloadStore: Send + Sync {
    /// One page of `user_id`'s downloads, newest first.
    async fn list_for_user(
        &self,
        user_id: UserId,
        page: Page,
    ) -> Result<Paged<Download>, RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct DownloadRow {
    id: DownloadId,
    file_type: String,
    created_at: DateTime<Utc>,
    design_id: DesignId,
    design_title: String,
    design_slug: String,
    design_preview_path: Option<String>,
}

impl From<DownloadRow> for Download {
    fn from(row: DownloadRow) -> Self {
        Self {
            id: row.id,
            design: DownloadedDesign {
                id: row.design_id,
                title: row.design_title,
                slug: row.design_slug,
                preview_path: row.design_preview_path,
            },
            file_type: row.file_type,
            created_at: row.created_at,
        }
    }
}

/// `PostgreSQL` download repository.
#[derive(Clone)]
pub struct DownloadRepository {
    pool: PgPool,
}

impl DownloadRepository {
    /// Create a new download repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DownloadStore for DownloadRepository {
    async fn list_for_user(
        &self,
        user_id: UserId,
        page: Page,
    ) -> Result<Paged<Download>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM app.download WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, DownloadRow>(
            r"
            SELECT dl.id, dl.file_type, dl.created_at,
                   d.id AS design_id, d.title AS design_title,
                   d.slug AS design_slug, d.preview_path AS design_preview_path
            FROM app.download dl
            JOIN app.design d ON d.id = dl.design_id
            WHERE dl.user_id = $1
            ORDER BY dl.created_at DESC, dl.id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paged {
            items: rows.into_iter().map(Into::into).collect(),
            total: super::count_to_u64(total)?,
        })
    }
}
