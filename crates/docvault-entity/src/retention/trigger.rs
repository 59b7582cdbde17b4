//! Retention trigger audit log entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable record of a retention trigger firing.
///
/// Captures the expiration before (null while awaiting the trigger) and
/// after the clock started.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RetentionTriggerLog {
    /// Unique log entry identifier.
    pub id: Uuid,
    /// The retention row the trigger started.
    pub retention_id: Uuid,
    /// The business event type that matched.
    pub trigger_type: String,
    /// Expiration before the trigger fired.
    pub previous_expiration: Option<DateTime<Utc>>,
    /// Expiration after the trigger fired.
    pub new_expiration: Option<DateTime<Utc>>,
    /// Who fired the event.
    pub fired_by: Uuid,
    /// When the event fired.
    pub fired_at: DateTime<Utc>,
}
