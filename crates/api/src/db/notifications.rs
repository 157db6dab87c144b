//! Notification repository.
//!
//! Every query is scoped to the owning user; there is no way to read or mark
//! another user's notifications through this module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use design_library_core::{NotificationId, UserId};

use super::RepositoryError;
use crate::models::Notification;

/// Notification operations used by the handlers.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Most recent notifications first, at most `limit`.
    async fn list_for_user(
        &self,
        user_id: UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, RepositoryError>;

    /// Number of unread notifications owned by `user_id`.
    async fn count_unread(&self, user_id: UserId) -> Result<u64, RepositoryError>;

    /// Mark the given notifications read. Ids owned by other users or already
    /// read are ignored. Returns how many rows changed.
    async fn mark_read(
        &self,
        user_id: UserId,
        ids: &[NotificationId],
    ) -> Result<u64, RepositoryError>;

    /// Mark every unread notification of `user_id` read. Returns how many rows changed.
    async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError>;
}

/// Internal row type for notification queries.
#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: NotificationId,
    user_id: UserId,
    #[sqlx(rename = "type")]
    kind: String,
    title: String,
    body: Option<String>,
    link: Option<String>,
    read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            kind: row.kind,
            title: row.title,
            body: row.body,
            link: row.link,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

/// `PostgreSQL` notification repository.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn list_for_user(
        &self,
        user_id: UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, type, title, body, link, read, created_at
            FROM app.notification
            WHERE user_id = $1
              AND ($2 = false OR read = false)
            ORDER BY created_at DESC, id
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_unread(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM app.notification WHERE user_id = $1 AND read = false",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        super::count_to_u64(count)
    }

    async fn mark_read(
        &self,
        user_id: UserId,
        ids: &[NotificationId],
    ) -> Result<u64, RepositoryError> {
        let ids: Vec<Uuid> = ids.iter().map(NotificationId::as_uuid).collect();
        let result = sqlx::query(
            r"
            UPDATE app.notification
            SET read = true
            WHERE user_id = $1 AND id = ANY($2) AND read = false
            ",
        )
        .bind(user_id)
        .bind(&ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE app.notification SET read = true WHERE user_id = $1 AND read = false",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
