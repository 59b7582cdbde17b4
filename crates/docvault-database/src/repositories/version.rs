//! Version chain repository trait and PostgreSQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::document::{DocumentVersion, VersionMetadataField};

/// Persistence operations for the append-only version chain and its
/// metadata snapshots.
#[async_trait]
pub trait VersionRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a version by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DocumentVersion>>;

    /// List a document's versions, newest first.
    async fn find_by_document(&self, document_id: Uuid) -> AppResult<Vec<DocumentVersion>>;

    /// Append a version row.
    async fn create(&self, version: &DocumentVersion) -> AppResult<DocumentVersion>;

    /// Insert metadata snapshot rows for a version.
    async fn insert_metadata(&self, fields: &[VersionMetadataField]) -> AppResult<()>;

    /// Load the metadata snapshot of a version.
    async fn find_metadata(&self, version_id: Uuid) -> AppResult<Vec<VersionMetadataField>>;

    /// Stamp the integrity-verification timestamp — the only mutation a
    /// version row ever receives.
    async fn set_integrity_verified(
        &self,
        version_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()>;
}

/// PostgreSQL-backed version repository.
#[derive(Debug, Clone)]
pub struct PgVersionRepository {
    pool: PgPool,
}

impl PgVersionRepository {
    /// Create a new version repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionRepository for PgVersionRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>("SELECT * FROM document_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    async fn find_by_document(&self, document_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE document_id = $1 \
             ORDER BY version_number DESC",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    async fn create(&self, version: &DocumentVersion) -> AppResult<DocumentVersion> {
        sqlx::query_as::<_, DocumentVersion>(
            "INSERT INTO document_versions (id, document_id, version_number, major_version, \
             minor_version, version_label, version_type, storage_path, size_bytes, \
             content_hash, hash_algorithm, content_type, is_content_changed, \
             is_metadata_changed, previous_version_id, change_description, comment, \
             created_by, created_at, integrity_verified_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20) RETURNING *",
        )
        .bind(version.id)
        .bind(version.document_id)
        .bind(version.version_number)
        .bind(version.major_version)
        .bind(version.minor_version)
        .bind(&version.version_label)
        .bind(version.version_type)
        .bind(&version.storage_path)
        .bind(version.size_bytes)
        .bind(&version.content_hash)
        .bind(&version.hash_algorithm)
        .bind(&version.content_type)
        .bind(version.is_content_changed)
        .bind(version.is_metadata_changed)
        .bind(version.previous_version_id)
        .bind(&version.change_description)
        .bind(&version.comment)
        .bind(version.created_by)
        .bind(version.created_at)
        .bind(version.integrity_verified_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create version", e))
    }

    async fn insert_metadata(&self, fields: &[VersionMetadataField]) -> AppResult<()> {
        for field in fields {
            sqlx::query(
                "INSERT INTO version_metadata_fields (id, version_id, field_key, text_value, \
                 numeric_value, date_value) VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(field.id)
            .bind(field.version_id)
            .bind(&field.field_key)
            .bind(&field.text_value)
            .bind(field.numeric_value)
            .bind(field.date_value)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to insert version metadata", e)
            })?;
        }
        Ok(())
    }

    async fn find_metadata(&self, version_id: Uuid) -> AppResult<Vec<VersionMetadataField>> {
        sqlx::query_as::<_, VersionMetadataField>(
            "SELECT * FROM version_metadata_fields WHERE version_id = $1 ORDER BY field_key",
        )
        .bind(version_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load version metadata", e)
        })
    }

    async fn set_integrity_verified(
        &self,
        version_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE document_versions SET integrity_verified_at = $2 WHERE id = $1")
            .bind(version_id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to stamp verification", e)
            })?;
        Ok(())
    }
}
