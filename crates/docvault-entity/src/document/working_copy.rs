//! Document working copy — the draft staging area while checked out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::model::Document;

/// Draft state for a checked-out document.
///
/// Exists if and only if the owning document is checked out. Every
/// mutable document field is mirrored as a `draft_*` field holding the
/// *target* state, pre-populated from the document at checkout so an
/// untouched draft is semantically identical to the published document.
/// Destroyed at check-in (unless the checkout is kept) or discard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentWorkingCopy {
    /// Unique working copy identifier.
    pub id: Uuid,
    /// The checked-out document.
    pub document_id: Uuid,
    /// Draft display name.
    pub draft_name: Option<String>,
    /// Draft description.
    pub draft_description: Option<String>,
    /// Draft classification reference.
    pub draft_classification_id: Option<Uuid>,
    /// Draft document type reference.
    pub draft_doc_type_id: Option<Uuid>,
    /// Draft importance level.
    pub draft_importance: Option<i32>,
    /// Path of the staged draft blob, distinct from the published slot.
    pub draft_storage_path: Option<String>,
    /// Draft content size in bytes.
    pub draft_size_bytes: Option<i64>,
    /// Draft content hash.
    pub draft_content_hash: Option<String>,
    /// Draft content MIME type.
    pub draft_content_type: Option<String>,
    /// Draft original file name.
    pub draft_original_file_name: Option<String>,
    /// Draft custom metadata (opaque JSON object).
    pub draft_metadata: Option<serde_json::Value>,
    /// The user who checked the document out.
    pub checked_out_by: Uuid,
    /// When the working copy was created.
    pub created_at: DateTime<Utc>,
    /// When the draft was last touched.
    pub updated_at: DateTime<Utc>,
}

impl DocumentWorkingCopy {
    /// Build a fresh working copy mirroring the document's current
    /// metadata, so an untouched draft publishes no changes. The draft
    /// content slot starts empty; the published pointer is never copied
    /// into it.
    pub fn mirroring(document: &Document, checked_out_by: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id: document.id,
            draft_name: Some(document.name.clone()),
            draft_description: document.description.clone(),
            draft_classification_id: document.classification_id,
            draft_doc_type_id: document.doc_type_id,
            draft_importance: document.importance,
            draft_storage_path: None,
            draft_size_bytes: None,
            draft_content_hash: None,
            draft_content_type: None,
            draft_original_file_name: None,
            draft_metadata: document.metadata.clone(),
            checked_out_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a draft blob has been staged.
    pub fn has_draft_content(&self) -> bool {
        self.draft_storage_path.is_some()
    }

    /// Reset to a clean mirror of the (just published) document for a new
    /// edit session, keeping the checkout alive (the "keep checked out"
    /// check-in path).
    pub fn reset_from(&mut self, document: &Document, now: DateTime<Utc>) {
        let fresh = Self::mirroring(document, self.checked_out_by, now);
        *self = Self {
            id: self.id,
            created_at: self.created_at,
            ..fresh
        };
    }
}
