//! Document retention row entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Status of one retention application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "retention_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RetentionStatus {
    /// Event-based retention whose trigger has not fired; the clock has
    /// not started.
    AwaitingTrigger,
    /// The retention clock is running (or the policy is permanent).
    Active,
    /// Suspended by a legal hold.
    OnHold,
    /// Expired and awaiting disposal review.
    PendingReview,
    /// The document was archived under this retention.
    Archived,
    /// The document was disposed under this retention.
    Deleted,
}

impl fmt::Display for RetentionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AwaitingTrigger => "awaiting_trigger",
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::PendingReview => "pending_review",
            Self::Archived => "archived",
            Self::Deleted => "deleted",
        };
        write!(f, "{s}")
    }
}

/// One application of a retention policy to a document.
///
/// Invariants: `status == OnHold` exactly when `suspended_at` is set;
/// `expiration_date`, when present, equals `retention_start_date` plus the
/// policy's retention days plus the cumulative suspended days.
/// `original_expiration_date` is recorded at creation and never moved by
/// suspension math; it preserves the audit baseline.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRetention {
    /// Unique retention row identifier.
    pub id: Uuid,
    /// The governed document.
    pub document_id: Uuid,
    /// The applied policy.
    pub policy_id: Uuid,
    /// When the retention clock started; `None` while awaiting a trigger.
    pub retention_start_date: Option<DateTime<Utc>>,
    /// When the document becomes disposal-eligible; `None` while awaiting
    /// a trigger or for permanent policies.
    pub expiration_date: Option<DateTime<Utc>>,
    /// The expiration as first computed, untouched by suspensions.
    pub original_expiration_date: Option<DateTime<Utc>>,
    /// Current status.
    pub status: RetentionStatus,
    /// When the current suspension began, if suspended.
    pub suspended_at: Option<DateTime<Utc>>,
    /// Cumulative days this retention has spent suspended.
    pub suspended_days: i64,
    /// The trigger event that started the clock, for event-based policies.
    pub trigger_event_id: Option<Uuid>,
    /// When this row was created.
    pub created_at: DateTime<Utc>,
    /// When this row was last updated.
    pub updated_at: DateTime<Utc>,
}
