//! Membership tier repository.

use async_trait::async_trait;
use sqlx::PgPool;

use design_library_core::TierId;

use super::RepositoryError;
use crate::models::Tier;

/// Tier lookups used by checkout.
#[async_trait]
pub trait TierStore: Send + Sync {
    /// A tier by ID, active or not.
    async fn get(&self, id: TierId) -> Result<Option<Tier>, RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct TierRow {
    id: TierId,
    slug: String,
    name: String,
    stripe_price_yearly: Option<String>,
    stripe_price_lifetime: Option<String>,
    active: bool,
}

impl From<TierRow> for Tier {
    fn from(row: TierRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            stripe_price_yearly: row.stripe_price_yearly,
            stripe_price_lifetime: row.stripe_price_lifetime,
            active: row.active,
        }
    }
}

/// `PostgreSQL` tier repository.
#[derive(Clone)]
pub struct TierRepository {
    pool: PgPool,
}

impl TierRepository {
    /// Create a new tier repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TierStore for TierRepository {
    async fn get(&self, id: TierId) -> Result<Option<Tier>, RepositoryError> {
        let row = sqlx::query_as::<_, TierRow>(
            r"
            SELECT id, slug, name, stripe_price_yearly, stripe_price_lifetime, active
            FROM app.tier
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
