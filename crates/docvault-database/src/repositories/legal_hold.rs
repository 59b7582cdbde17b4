//! PostgreSQL legal-hold query.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::LegalHoldQuery;

/// Legal-hold query answering from the document row's hold flag.
///
/// Hold case management lives outside this core; the flag is maintained
/// by the lifecycle service's hold path.
#[derive(Debug, Clone)]
pub struct PgLegalHoldQuery {
    pool: PgPool,
}

impl PgLegalHoldQuery {
    /// Create a new legal-hold query.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LegalHoldQuery for PgLegalHoldQuery {
    async fn is_on_hold(&self, document_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT is_on_legal_hold FROM documents WHERE id = $1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map(|found| found.unwrap_or(false))
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query legal hold", e))
    }
}
