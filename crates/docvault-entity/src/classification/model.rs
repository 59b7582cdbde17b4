//! Classification entity (read-only hierarchy for this core).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One node of the classification hierarchy.
///
/// The retention engine walks the parent chain looking for the first
/// node carrying a default retention policy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Classification {
    /// Unique classification identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Parent node; `None` at the root.
    pub parent_id: Option<Uuid>,
    /// Retention policy applied by default to documents classified here
    /// (or below, if no nearer ancestor defines one).
    pub default_retention_policy_id: Option<Uuid>,
}
