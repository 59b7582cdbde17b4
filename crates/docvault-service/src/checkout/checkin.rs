//! Check-in building blocks.
//!
//! Check-in resolves four questions in sequence: how the label advances,
//! where the authoritative content comes from, what actually changed,
//! and how the checkout tears down. The first three are pure functions
//! here; I/O happens only in [`super::service::CheckoutService`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use docvault_entity::document::{Document, DocumentWorkingCopy, VersionType};

/// Caller-supplied options for a check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    /// How the human-facing label advances.
    pub version_type: VersionType,
    /// Free-form comment recorded on the version.
    pub comment: Option<String>,
    /// What changed, per the author.
    pub change_description: Option<String>,
    /// Keep the checkout alive with a fresh draft after publishing.
    #[serde(default)]
    pub keep_checked_out: bool,
}

/// Content supplied inline at check-in time.
#[derive(Debug, Clone)]
pub struct NewContent {
    /// The file bytes.
    pub data: Bytes,
    /// The uploaded file name.
    pub file_name: String,
    /// The claimed MIME type.
    pub content_type: Option<String>,
}

/// Where the new version's authoritative content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// Bytes supplied inline with the check-in call.
    Inline,
    /// The draft blob staged earlier in the working copy.
    Draft,
    /// No new content; the published pointer carries over.
    Unchanged,
}

/// Resolve the label numbering for a check-in.
///
/// `Overwrite` keeps the label (content changes without advancing it),
/// `Minor` bumps minor, `Major` bumps major and zeroes minor. The dense
/// version number always advances by one regardless.
pub fn next_label(major: i32, minor: i32, version_type: VersionType) -> (i32, i32) {
    match version_type {
        VersionType::Major => (major + 1, 0),
        VersionType::Minor => (major, minor + 1),
        VersionType::Overwrite => (major, minor),
    }
}

/// Resolve content source precedence: an inline upload beats a staged
/// draft blob, which beats keeping the published content.
pub fn resolve_content_source(
    has_inline: bool,
    working_copy: Option<&DocumentWorkingCopy>,
) -> ContentSource {
    if has_inline {
        ContentSource::Inline
    } else if working_copy.is_some_and(|wc| wc.has_draft_content()) {
        ContentSource::Draft
    } else {
        ContentSource::Unchanged
    }
}

/// Whether the draft metadata differs from the published document.
///
/// Draft fields hold target state, so any difference (including an
/// explicit clear to null and including the custom-metadata JSON blob)
/// counts as a change.
pub fn metadata_changed(document: &Document, working_copy: &DocumentWorkingCopy) -> bool {
    working_copy
        .draft_name
        .as_ref()
        .is_some_and(|n| *n != document.name)
        || working_copy.draft_description != document.description
        || working_copy.draft_classification_id != document.classification_id
        || working_copy.draft_doc_type_id != document.doc_type_id
        || working_copy.draft_importance != document.importance
        || (working_copy.draft_metadata.is_some()
            && working_copy.draft_metadata != document.metadata)
}

/// Apply the draft metadata onto the document as its new published state.
pub fn apply_draft_metadata(document: &mut Document, working_copy: &DocumentWorkingCopy) {
    if let Some(name) = &working_copy.draft_name {
        document.name = name.clone();
    }
    document.description = working_copy.draft_description.clone();
    document.classification_id = working_copy.draft_classification_id;
    document.doc_type_id = working_copy.draft_doc_type_id;
    document.importance = working_copy.draft_importance;
    if working_copy.draft_metadata.is_some() {
        document.metadata = working_copy.draft_metadata.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_next_label() {
        assert_eq!(next_label(2, 3, VersionType::Major), (3, 0));
        assert_eq!(next_label(2, 3, VersionType::Minor), (2, 4));
        assert_eq!(next_label(2, 3, VersionType::Overwrite), (2, 3));
    }

    #[test]
    fn test_content_source_precedence() {
        let document = fixtures::document();
        let mut wc = DocumentWorkingCopy::mirroring(&document, Uuid::new_v4(), Utc::now());

        assert_eq!(
            resolve_content_source(false, Some(&wc)),
            ContentSource::Unchanged
        );
        assert_eq!(resolve_content_source(false, None), ContentSource::Unchanged);

        wc.draft_storage_path = Some("drafts/x/file.txt".into());
        assert_eq!(
            resolve_content_source(false, Some(&wc)),
            ContentSource::Draft
        );
        // Inline upload wins even over a staged draft.
        assert_eq!(
            resolve_content_source(true, Some(&wc)),
            ContentSource::Inline
        );
    }

    #[test]
    fn test_untouched_mirror_is_unchanged() {
        let document = fixtures::document();
        let wc = DocumentWorkingCopy::mirroring(&document, Uuid::new_v4(), Utc::now());
        assert!(!metadata_changed(&document, &wc));
    }

    #[test]
    fn test_cleared_description_counts_as_change() {
        let mut document = fixtures::document();
        document.description = Some("original".into());
        let mut wc = DocumentWorkingCopy::mirroring(&document, Uuid::new_v4(), Utc::now());
        wc.draft_description = None;

        assert!(metadata_changed(&document, &wc));
        apply_draft_metadata(&mut document, &wc);
        assert_eq!(document.description, None);
    }

    #[test]
    fn test_custom_metadata_json_counts_as_change() {
        let document = fixtures::document();
        let mut wc = DocumentWorkingCopy::mirroring(&document, Uuid::new_v4(), Utc::now());
        wc.draft_metadata = Some(serde_json::json!({"department": "legal"}));
        assert!(metadata_changed(&document, &wc));
    }
}
