//! Document repository trait and PostgreSQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::document::Document;

/// Persistence operations for the document aggregate.
#[async_trait]
pub trait DocumentRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a document by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>>;

    /// Insert a new document row.
    async fn create(&self, document: &Document) -> AppResult<Document>;

    /// Update a document row in full.
    async fn update(&self, document: &Document) -> AppResult<Document>;

    /// Atomically claim the checkout: set the checkout fields only if the
    /// document is not currently checked out. Returns `true` when the
    /// claim won. This single-row conditional update is what closes the
    /// read-then-write race on the advisory checkout lock.
    async fn claim_checkout(
        &self,
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Clear the checkout fields.
    async fn release_checkout(&self, id: Uuid) -> AppResult<()>;

    /// Documents whose checkout was claimed before the cutoff and never
    /// released.
    async fn find_stale_checkouts(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Document>>;
}

/// PostgreSQL-backed document repository.
#[derive(Debug, Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find document", e))
    }

    async fn create(&self, document: &Document) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "INSERT INTO documents (id, folder_id, name, description, classification_id, \
             doc_type_id, importance, storage_path, size_bytes, content_hash, hash_algorithm, \
             content_type, original_file_name, current_version, current_major_version, \
             current_minor_version, current_version_id, state, previous_state, \
             state_changed_at, state_changed_by, record_declared_at, archived_at, disposed_at, \
             is_checked_out, checked_out_by, checked_out_at, is_on_legal_hold, legal_hold_id, \
             retention_policy_id, metadata, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32, \
             $33, $34) RETURNING *",
        )
        .bind(document.id)
        .bind(document.folder_id)
        .bind(&document.name)
        .bind(&document.description)
        .bind(document.classification_id)
        .bind(document.doc_type_id)
        .bind(document.importance)
        .bind(&document.storage_path)
        .bind(document.size_bytes)
        .bind(&document.content_hash)
        .bind(&document.hash_algorithm)
        .bind(&document.content_type)
        .bind(&document.original_file_name)
        .bind(document.current_version)
        .bind(document.current_major_version)
        .bind(document.current_minor_version)
        .bind(document.current_version_id)
        .bind(document.state)
        .bind(document.previous_state)
        .bind(document.state_changed_at)
        .bind(document.state_changed_by)
        .bind(document.record_declared_at)
        .bind(document.archived_at)
        .bind(document.disposed_at)
        .bind(document.is_checked_out)
        .bind(document.checked_out_by)
        .bind(document.checked_out_at)
        .bind(document.is_on_legal_hold)
        .bind(document.legal_hold_id)
        .bind(document.retention_policy_id)
        .bind(&document.metadata)
        .bind(document.created_by)
        .bind(document.created_at)
        .bind(document.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create document", e))
    }

    async fn update(&self, document: &Document) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET folder_id = $2, name = $3, description = $4, \
             classification_id = $5, doc_type_id = $6, importance = $7, storage_path = $8, \
             size_bytes = $9, content_hash = $10, hash_algorithm = $11, content_type = $12, \
             original_file_name = $13, current_version = $14, current_major_version = $15, \
             current_minor_version = $16, current_version_id = $17, state = $18, \
             previous_state = $19, state_changed_at = $20, state_changed_by = $21, \
             record_declared_at = $22, archived_at = $23, disposed_at = $24, \
             is_checked_out = $25, checked_out_by = $26, checked_out_at = $27, \
             is_on_legal_hold = $28, legal_hold_id = $29, retention_policy_id = $30, \
             metadata = $31, updated_at = $32 \
             WHERE id = $1 RETURNING *",
        )
        .bind(document.id)
        .bind(document.folder_id)
        .bind(&document.name)
        .bind(&document.description)
        .bind(document.classification_id)
        .bind(document.doc_type_id)
        .bind(document.importance)
        .bind(&document.storage_path)
        .bind(document.size_bytes)
        .bind(&document.content_hash)
        .bind(&document.hash_algorithm)
        .bind(&document.content_type)
        .bind(&document.original_file_name)
        .bind(document.current_version)
        .bind(document.current_major_version)
        .bind(document.current_minor_version)
        .bind(document.current_version_id)
        .bind(document.state)
        .bind(document.previous_state)
        .bind(document.state_changed_at)
        .bind(document.state_changed_by)
        .bind(document.record_declared_at)
        .bind(document.archived_at)
        .bind(document.disposed_at)
        .bind(document.is_checked_out)
        .bind(document.checked_out_by)
        .bind(document.checked_out_at)
        .bind(document.is_on_legal_hold)
        .bind(document.legal_hold_id)
        .bind(document.retention_policy_id)
        .bind(&document.metadata)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update document", e))
    }

    async fn claim_checkout(
        &self,
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE documents SET is_checked_out = TRUE, checked_out_by = $2, \
             checked_out_at = $3, updated_at = $3 \
             WHERE id = $1 AND is_checked_out = FALSE",
        )
        .bind(id)
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim checkout", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn release_checkout(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE documents SET is_checked_out = FALSE, checked_out_by = NULL, \
             checked_out_at = NULL, updated_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to release checkout", e)
        })?;
        Ok(())
    }

    async fn find_stale_checkouts(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE is_checked_out = TRUE AND checked_out_at < $1 \
             ORDER BY checked_out_at ASC",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list stale checkouts", e)
        })
    }
}
