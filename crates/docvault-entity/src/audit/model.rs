//! Activity log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable activity log entry recording a user or system action.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLogEntry {
    /// Unique entry identifier.
    pub id: Uuid,
    /// The user who performed the action.
    pub actor_id: Uuid,
    /// The action performed (e.g., `"document.check_in"`).
    pub action: String,
    /// The type of subject (e.g., `"document"`).
    pub subject_type: String,
    /// The subject identifier.
    pub subject_id: Uuid,
    /// The subject's display name at the time of the action.
    pub subject_name: String,
    /// Free-form detail about the action.
    pub detail: Option<String>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}
