//! Document aggregate root entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::state::DocumentState;

/// A managed document.
///
/// The aggregate root of the versioning and lifecycle engine. Checkout
/// flags, version pointers, lifecycle state, and retention references all
/// live on this row; each is mutated by exactly one service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Unique document identifier.
    pub id: Uuid,
    /// The folder containing this document.
    pub folder_id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Classification reference.
    pub classification_id: Option<Uuid>,
    /// Document type reference.
    pub doc_type_id: Option<Uuid>,
    /// Importance level (1 = low .. 5 = critical).
    pub importance: Option<i32>,

    // Published content pointer
    /// Path of the published blob within the storage provider.
    pub storage_path: Option<String>,
    /// Size of the published content in bytes.
    pub size_bytes: i64,
    /// Hex-encoded content hash of the published blob.
    pub content_hash: Option<String>,
    /// Hash algorithm name.
    pub hash_algorithm: Option<String>,
    /// MIME type of the published content.
    pub content_type: Option<String>,
    /// The file name as originally uploaded.
    pub original_file_name: Option<String>,

    // Version pointers
    /// Dense version counter; equals the version number of
    /// `current_version_id`.
    pub current_version: i32,
    /// Human-facing major version.
    pub current_major_version: i32,
    /// Human-facing minor version.
    pub current_minor_version: i32,
    /// The latest version row.
    pub current_version_id: Option<Uuid>,

    // Lifecycle
    /// Current lifecycle state.
    pub state: DocumentState,
    /// State held before a legal hold forced `OnHold`; used only for
    /// hold restore.
    pub previous_state: Option<DocumentState>,
    /// When the state last changed.
    pub state_changed_at: Option<DateTime<Utc>>,
    /// Who last changed the state.
    pub state_changed_by: Option<Uuid>,
    /// Stamped when the document entered `Record`.
    pub record_declared_at: Option<DateTime<Utc>>,
    /// Stamped when the document entered `Archived`.
    pub archived_at: Option<DateTime<Utc>>,
    /// Stamped when the document entered `Disposed`.
    pub disposed_at: Option<DateTime<Utc>>,

    // Checkout (advisory persisted lock)
    /// Whether the document is currently checked out.
    pub is_checked_out: bool,
    /// The user holding the checkout.
    pub checked_out_by: Option<Uuid>,
    /// When the checkout was claimed.
    pub checked_out_at: Option<DateTime<Utc>>,

    // Legal hold
    /// Whether the document is under legal hold.
    pub is_on_legal_hold: bool,
    /// The hold case identifier.
    pub legal_hold_id: Option<Uuid>,

    // Retention
    /// The retention policy currently applied.
    pub retention_policy_id: Option<Uuid>,

    /// Arbitrary custom metadata (JSON object of field key to value).
    pub metadata: Option<serde_json::Value>,

    /// Who created the document.
    pub created_by: Uuid,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Whether the given user currently holds the checkout.
    pub fn is_checked_out_by(&self, user_id: Uuid) -> bool {
        self.is_checked_out && self.checked_out_by == Some(user_id)
    }

    /// The current human-facing version label.
    pub fn version_label(&self) -> String {
        format!(
            "{}.{}",
            self.current_major_version, self.current_minor_version
        )
    }
}
