//! Transition rule and transition log repositories.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::document::{DocumentState, StateTransitionLog, TransitionRule};

/// Read access to the externally configured transition rule table.
#[async_trait]
pub trait TransitionRuleRepository: Send + Sync + std::fmt::Debug + 'static {
    /// The rule for `(from, to)`, if one is configured.
    async fn get_rule(
        &self,
        from: DocumentState,
        to: DocumentState,
    ) -> AppResult<Option<TransitionRule>>;

    /// All rules leaving the given state.
    async fn rules_from(&self, from: DocumentState) -> AppResult<Vec<TransitionRule>>;
}

/// Append access to the state transition log.
#[async_trait]
pub trait TransitionLogRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Append a transition log entry.
    async fn append(&self, entry: &StateTransitionLog) -> AppResult<()>;

    /// Transition history of a document, oldest first.
    async fn find_by_document(&self, document_id: Uuid) -> AppResult<Vec<StateTransitionLog>>;
}

/// PostgreSQL-backed transition rule repository.
#[derive(Debug, Clone)]
pub struct PgTransitionRuleRepository {
    pool: PgPool,
}

impl PgTransitionRuleRepository {
    /// Create a new rule repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransitionRuleRepository for PgTransitionRuleRepository {
    async fn get_rule(
        &self,
        from: DocumentState,
        to: DocumentState,
    ) -> AppResult<Option<TransitionRule>> {
        sqlx::query_as::<_, TransitionRule>(
            "SELECT * FROM transition_rules WHERE from_state = $1 AND to_state = $2",
        )
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to look up transition rule", e)
        })
    }

    async fn rules_from(&self, from: DocumentState) -> AppResult<Vec<TransitionRule>> {
        sqlx::query_as::<_, TransitionRule>(
            "SELECT * FROM transition_rules WHERE from_state = $1",
        )
        .bind(from)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list transition rules", e)
        })
    }
}

/// PostgreSQL-backed transition log repository.
#[derive(Debug, Clone)]
pub struct PgTransitionLogRepository {
    pool: PgPool,
}

impl PgTransitionLogRepository {
    /// Create a new transition log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransitionLogRepository for PgTransitionLogRepository {
    async fn append(&self, entry: &StateTransitionLog) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO state_transition_log (id, document_id, from_state, to_state, \
             transitioned_by, transitioned_at, reason, rule_id, is_system_action) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(entry.id)
        .bind(entry.document_id)
        .bind(entry.from_state)
        .bind(entry.to_state)
        .bind(entry.transitioned_by)
        .bind(entry.transitioned_at)
        .bind(&entry.reason)
        .bind(entry.rule_id)
        .bind(entry.is_system_action)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to append transition log", e)
        })?;
        Ok(())
    }

    async fn find_by_document(
        &self,
        document_id: Uuid,
    ) -> AppResult<Vec<StateTransitionLog>> {
        sqlx::query_as::<_, StateTransitionLog>(
            "SELECT * FROM state_transition_log WHERE document_id = $1 \
             ORDER BY transitioned_at ASC",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load transition history", e)
        })
    }
}
