//! Classification repository trait and PostgreSQL implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::classification::Classification;

/// Read access to the classification hierarchy.
#[async_trait]
pub trait ClassificationRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a classification node by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Classification>>;
}

/// PostgreSQL-backed classification repository.
#[derive(Debug, Clone)]
pub struct PgClassificationRepository {
    pool: PgPool,
}

impl PgClassificationRepository {
    /// Create a new classification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClassificationRepository for PgClassificationRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Classification>> {
        sqlx::query_as::<_, Classification>("SELECT * FROM classifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find classification", e)
            })
    }
}
