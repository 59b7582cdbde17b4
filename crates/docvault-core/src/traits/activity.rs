//! Activity log sink trait.

use async_trait::async_trait;
use uuid::Uuid;

/// A single activity record describing who did what to which subject.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ActivityRecord {
    /// The action performed (e.g., `"document.check_out"`).
    pub action: String,
    /// The type of subject (e.g., `"document"`).
    pub subject_type: String,
    /// The subject's identifier.
    pub subject_id: Uuid,
    /// The subject's display name at the time of the action.
    pub subject_name: String,
    /// Free-form detail about the action.
    pub detail: Option<String>,
    /// The acting user.
    pub actor_id: Uuid,
}

/// Trait for the activity-log sink.
///
/// Recording is fire-and-forget from the services' perspective: sink
/// failures are logged by implementations and never propagated into the
/// enclosing operation.
#[async_trait]
pub trait ActivityLog: Send + Sync + std::fmt::Debug + 'static {
    /// Record an activity entry.
    async fn record(&self, record: ActivityRecord);
}
