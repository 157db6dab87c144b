//! Email template repository (read-only).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::EmailTemplateRecord;

/// Email template reads used by the admin console.
#[async_trait]
pub trait EmailTemplateStore: Send + Sync {
    /// Every template, ordered by key.
    async fn list(&self) -> Result<Vec<EmailTemplateRecord>, RepositoryError>;

    /// One template by key.
    async fn get(&self, key: &str) -> Result<Option<EmailTemplateRecord>, RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct EmailTemplateRow {
    key: String,
    name: String,
    subject: String,
    body: String,
    description: Option<String>,
    updated_at: DateTime<Utc>,
}

impl From<EmailTemplateRow> for EmailTemplateRecord {
    fn from(row: EmailTemplateRow) -> Self {
        Self {
            key: row.key,
            name: row.name,
            subject: row.subject,
            body: row.body,
            description: row.description,
            updated_at: row.updated_at,
        }
    }
}

/// `PostgreSQL` email template repository.
#[derive(Clone)]
pub struct EmailTemplateRepository {
    pool: PgPool,
}

impl EmailTemplateRepository {
    /// Create a new email template repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailTemplateStore for EmailTemplateRepository {
    async fn list(&self) -> Result<Vec<EmailTemplateRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, EmailTemplateRow>(
            r"
            SELECT key, name, subject, body, description, updated_at
            FROM app.email_template
            ORDER BY key
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, key: &str) -> Result<Option<EmailTemplateRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, EmailTemplateRow>(
            r"
            SELECT key, name, subject, body, description, updated_at
            FROM app.email_template
            WHERE key = $1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
