//! PostgreSQL activity log sink.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use docvault_core::traits::{ActivityLog, ActivityRecord};

/// Activity log sink writing to the `activity_log` table.
///
/// Recording is fire-and-forget: failures are logged and swallowed so an
/// audit-sink outage never fails the business operation that produced
/// the record.
#[derive(Debug, Clone)]
pub struct PgActivityLog {
    pool: PgPool,
}

impl PgActivityLog {
    /// Create a new activity log sink.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLog for PgActivityLog {
    async fn record(&self, record: ActivityRecord) {
        let result = sqlx::query(
            "INSERT INTO activity_log (id, actor_id, action, subject_type, subject_id, \
             subject_name, detail, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(Uuid::new_v4())
        .bind(record.actor_id)
        .bind(&record.action)
        .bind(&record.subject_type)
        .bind(record.subject_id)
        .bind(&record.subject_name)
        .bind(&record.detail)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            warn!(action = %record.action, error = %e, "Failed to record activity entry");
        }
    }
}
