//! Working copy repository trait and PostgreSQL implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::document::DocumentWorkingCopy;

/// Persistence operations for document working copies.
#[async_trait]
pub trait WorkingCopyRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find the working copy of a document, if it is checked out.
    async fn find_by_document(&self, document_id: Uuid)
        -> AppResult<Option<DocumentWorkingCopy>>;

    /// Insert a new working copy row.
    async fn create(&self, copy: &DocumentWorkingCopy) -> AppResult<DocumentWorkingCopy>;

    /// Update a working copy row in full.
    async fn update(&self, copy: &DocumentWorkingCopy) -> AppResult<DocumentWorkingCopy>;

    /// Delete the working copy of a document. Returns `true` if one existed.
    async fn delete_by_document(&self, document_id: Uuid) -> AppResult<bool>;
}

/// PostgreSQL-backed working copy repository.
#[derive(Debug, Clone)]
pub struct PgWorkingCopyRepository {
    pool: PgPool,
}

impl PgWorkingCopyRepository {
    /// Create a new working copy repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkingCopyRepository for PgWorkingCopyRepository {
    async fn find_by_document(
        &self,
        document_id: Uuid,
    ) -> AppResult<Option<DocumentWorkingCopy>> {
        sqlx::query_as::<_, DocumentWorkingCopy>(
            "SELECT * FROM document_working_copies WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find working copy", e))
    }

    async fn create(&self, copy: &DocumentWorkingCopy) -> AppResult<DocumentWorkingCopy> {
        sqlx::query_as::<_, DocumentWorkingCopy>(
            "INSERT INTO document_working_copies (id, document_id, draft_name, \
             draft_description, draft_classification_id, draft_doc_type_id, draft_importance, \
             draft_storage_path, draft_size_bytes, draft_content_hash, draft_content_type, \
             draft_original_file_name, draft_metadata, checked_out_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING *",
        )
        .bind(copy.id)
        .bind(copy.document_id)
        .bind(&copy.draft_name)
        .bind(&copy.draft_description)
        .bind(copy.draft_classification_id)
        .bind(copy.draft_doc_type_id)
        .bind(copy.draft_importance)
        .bind(&copy.draft_storage_path)
        .bind(copy.draft_size_bytes)
        .bind(&copy.draft_content_hash)
        .bind(&copy.draft_content_type)
        .bind(&copy.draft_original_file_name)
        .bind(&copy.draft_metadata)
        .bind(copy.checked_out_by)
        .bind(copy.created_at)
        .bind(copy.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create working copy", e)
        })
    }

    async fn update(&self, copy: &DocumentWorkingCopy) -> AppResult<DocumentWorkingCopy> {
        sqlx::query_as::<_, DocumentWorkingCopy>(
            "UPDATE document_working_copies SET draft_name = $2, draft_description = $3, \
             draft_classification_id = $4, draft_doc_type_id = $5, draft_importance = $6, \
             draft_storage_path = $7, draft_size_bytes = $8, draft_content_hash = $9, \
             draft_content_type = $10, draft_original_file_name = $11, draft_metadata = $12, \
             updated_at = $13 WHERE id = $1 RETURNING *",
        )
        .bind(copy.id)
        .bind(&copy.draft_name)
        .bind(&copy.draft_description)
        .bind(copy.draft_classification_id)
        .bind(copy.draft_doc_type_id)
        .bind(copy.draft_importance)
        .bind(&copy.draft_storage_path)
        .bind(copy.draft_size_bytes)
        .bind(&copy.draft_content_hash)
        .bind(&copy.draft_content_type)
        .bind(&copy.draft_original_file_name)
        .bind(&copy.draft_metadata)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update working copy", e)
        })
    }

    async fn delete_by_document(&self, document_id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM document_working_copies WHERE document_id = $1")
                .bind(document_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to delete working copy", e)
                })?;
        Ok(result.rows_affected() > 0)
    }
}
