//! Retention row and retention policy repositories.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::retention::{DocumentRetention, RetentionPolicy, RetentionTriggerLog};

/// Persistence operations for per-document retention rows.
#[async_trait]
pub trait RetentionRepository: Send + Sync + std::fmt::Debug + 'static {
    /// All retention rows of a document.
    async fn find_by_document(&self, document_id: Uuid) -> AppResult<Vec<DocumentRetention>>;

    /// The retention row for one document/policy pair.
    async fn find_by_document_and_policy(
        &self,
        document_id: Uuid,
        policy_id: Uuid,
    ) -> AppResult<Option<DocumentRetention>>;

    /// Insert a retention row.
    async fn create(&self, retention: &DocumentRetention) -> AppResult<DocumentRetention>;

    /// Update a retention row in full.
    async fn update(&self, retention: &DocumentRetention) -> AppResult<DocumentRetention>;

    /// Delete a retention row (used when a policy is re-applied).
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Append an immutable trigger audit entry.
    async fn append_trigger_log(&self, entry: &RetentionTriggerLog) -> AppResult<()>;
}

/// Read access to retention policy configuration.
#[async_trait]
pub trait RetentionPolicyRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a policy by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RetentionPolicy>>;

    /// Exact applicable-policy lookup by folder, classification, and
    /// document type.
    async fn find_applicable(
        &self,
        folder_id: Option<Uuid>,
        classification_id: Option<Uuid>,
        doc_type_id: Option<Uuid>,
    ) -> AppResult<Option<RetentionPolicy>>;
}

/// PostgreSQL-backed retention repository.
#[derive(Debug, Clone)]
pub struct PgRetentionRepository {
    pool: PgPool,
}

impl PgRetentionRepository {
    /// Create a new retention repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RetentionRepository for PgRetentionRepository {
    async fn find_by_document(&self, document_id: Uuid) -> AppResult<Vec<DocumentRetention>> {
        sqlx::query_as::<_, DocumentRetention>(
            "SELECT * FROM document_retentions WHERE document_id = $1 ORDER BY created_at",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list retention rows", e)
        })
    }

    async fn find_by_document_and_policy(
        &self,
        document_id: Uuid,
        policy_id: Uuid,
    ) -> AppResult<Option<DocumentRetention>> {
        sqlx::query_as::<_, DocumentRetention>(
            "SELECT * FROM document_retentions WHERE document_id = $1 AND policy_id = $2",
        )
        .bind(document_id)
        .bind(policy_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find retention row", e)
        })
    }

    async fn create(&self, retention: &DocumentRetention) -> AppResult<DocumentRetention> {
        sqlx::query_as::<_, DocumentRetention>(
            "INSERT INTO document_retentions (id, document_id, policy_id, \
             retention_start_date, expiration_date, original_expiration_date, status, \
             suspended_at, suspended_days, trigger_event_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
        )
        .bind(retention.id)
        .bind(retention.document_id)
        .bind(retention.policy_id)
        .bind(retention.retention_start_date)
        .bind(retention.expiration_date)
        .bind(retention.original_expiration_date)
        .bind(retention.status)
        .bind(retention.suspended_at)
        .bind(retention.suspended_days)
        .bind(retention.trigger_event_id)
        .bind(retention.created_at)
        .bind(retention.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create retention row", e)
        })
    }

    async fn update(&self, retention: &DocumentRetention) -> AppResult<DocumentRetention> {
        sqlx::query_as::<_, DocumentRetention>(
            "UPDATE document_retentions SET retention_start_date = $2, expiration_date = $3, \
             original_expiration_date = $4, status = $5, suspended_at = $6, \
             suspended_days = $7, trigger_event_id = $8, updated_at = $9 \
             WHERE id = $1 RETURNING *",
        )
        .bind(retention.id)
        .bind(retention.retention_start_date)
        .bind(retention.expiration_date)
        .bind(retention.original_expiration_date)
        .bind(retention.status)
        .bind(retention.suspended_at)
        .bind(retention.suspended_days)
        .bind(retention.trigger_event_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update retention row", e)
        })
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM document_retentions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete retention row", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn append_trigger_log(&self, entry: &RetentionTriggerLog) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO retention_trigger_log (id, retention_id, trigger_type, \
             previous_expiration, new_expiration, fired_by, fired_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(entry.retention_id)
        .bind(&entry.trigger_type)
        .bind(entry.previous_expiration)
        .bind(entry.new_expiration)
        .bind(entry.fired_by)
        .bind(entry.fired_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to append trigger log", e)
        })?;
        Ok(())
    }
}

/// PostgreSQL-backed retention policy repository.
#[derive(Debug, Clone)]
pub struct PgRetentionPolicyRepository {
    pool: PgPool,
}

impl PgRetentionPolicyRepository {
    /// Create a new policy repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RetentionPolicyRepository for PgRetentionPolicyRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RetentionPolicy>> {
        sqlx::query_as::<_, RetentionPolicy>("SELECT * FROM retention_policies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find policy", e))
    }

    async fn find_applicable(
        &self,
        folder_id: Option<Uuid>,
        classification_id: Option<Uuid>,
        doc_type_id: Option<Uuid>,
    ) -> AppResult<Option<RetentionPolicy>> {
        // Most specific match wins: all three scopes beat two, beat one.
        sqlx::query_as::<_, RetentionPolicy>(
            "SELECT * FROM retention_policies \
             WHERE (folder_id IS NULL OR folder_id = $1) \
               AND (classification_id IS NULL OR classification_id = $2) \
               AND (doc_type_id IS NULL OR doc_type_id = $3) \
               AND (folder_id IS NOT NULL OR classification_id IS NOT NULL \
                    OR doc_type_id IS NOT NULL) \
             ORDER BY (folder_id IS NOT NULL)::int + (classification_id IS NOT NULL)::int \
                    + (doc_type_id IS NOT NULL)::int DESC \
             LIMIT 1",
        )
        .bind(folder_id)
        .bind(classification_id)
        .bind(doc_type_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find applicable policy", e)
        })
    }
}
