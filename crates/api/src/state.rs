//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::{
    DownloadRepository, DownloadStore, EmailTemplateRepository, EmailTemplateStore,
    IdentityRepository, IdentityStore, ImportRepository, ImportStore, NotificationRepository,
    NotificationStore, TierRepository, TierStore,
};
use crate::db::memory::InMemoryStore;
use crate::services::{HttpJobQueue, JobQueue, PaymentError, PaymentProcessor, QueueError, StripeClient};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("stripe client: {0}")]
    Stripe(#[from] PaymentError),
    #[error("queue client: {0}")]
    Queue(#[from] QueueError),
}

/// The external systems handlers delegate to.
#[derive(Clone)]
pub struct Backends {
    pub identities: Arc<dyn IdentityStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub templates: Arc<dyn EmailTemplateStore>,
    pub imports: Arc<dyn ImportStore>,
    pub downloads: Arc<dyn DownloadStore>,
    pub tiers: Arc<dyn TierStore>,
    pub payments: Arc<dyn PaymentProcessor>,
    /// `None` when the managed queue is not configured.
    pub queue: Option<Arc<dyn JobQueue>>,
}

impl Backends {
    /// `PostgreSQL` repositories plus the given external clients.
    #[must_use]
    pub fn postgres(
        pool: &PgPool,
        payments: Arc<dyn PaymentProcessor>,
        queue: Option<Arc<dyn JobQueue>>,
    ) -> Self {
        Self {
            identities: Arc::new(IdentityRepository::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool.clone())),
            templates: Arc::new(EmailTemplateRepository::new(pool.clone())),
            imports: Arc::new(ImportRepository::new(pool.clone())),
            downloads: Arc::new(DownloadRepository::new(pool.clone())),
            tiers: Arc::new(TierRepository::new(pool.clone())),
            payments,
            queue,
        }
    }

    /// Every store backed by one [`InMemoryStore`].
    #[must_use]
    pub fn in_memory(
        store: &Arc<InMemoryStore>,
        payments: Arc<dyn PaymentProcessor>,
        queue: Option<Arc<dyn JobQueue>>,
    ) -> Self {
        Self {
            identities: store.clone(),
            notifications: store.clone(),
            templates: store.clone(),
            imports: store.clone(),
            downloads: store.clone(),
            tiers: store.clone(),
            payments,
            queue,
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    backends: Backends,
}

impl AppState {
    /// Create the production state: `PostgreSQL` stores, Stripe, and the
    /// queue client when configured.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: AppConfig, pool: PgPool) -> Result<Self, StateError> {
        let payments: Arc<dyn PaymentProcessor> = Arc::new(StripeClient::new(&config.stripe)?);
        let queue = match &config.queue {
            Some(queue_config) => {
                Some(Arc::new(HttpJobQueue::new(queue_config)?) as Arc<dyn JobQueue>)
            }
            None => None,
        };
        let backends = Backends::postgres(&pool, payments, queue);

        Ok(Self::with_backends(config, pool, backends))
    }

    /// Create state with explicit backends (used by tests).
    #[must_use]
    pub fn with_backends(config: AppConfig, pool: PgPool, backends: Backends) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                backends,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the external systems handlers delegate to.
    #[must_use]
    pub fn backends(&self) -> &Backends {
        &self.inner.backends
    }
}
