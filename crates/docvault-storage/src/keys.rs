//! Storage key scheme.
//!
//! Draft blobs and published version blobs always live under distinct
//! prefixes so a draft can never shadow published content. Only the
//! checkout service writes draft keys; only the check-in path promotes
//! a draft to a published key.

use uuid::Uuid;

/// Key for the published blob of one document version.
pub fn published_key(document_id: Uuid, version_number: i32, file_name: &str) -> String {
    format!("documents/{document_id}/v{version_number}/{file_name}")
}

/// Key for the single draft blob of a checked-out document.
pub fn draft_key(document_id: Uuid, file_name: &str) -> String {
    format!("drafts/{document_id}/{file_name}")
}

/// Key for the write-once mirror of a record's published blob.
pub fn mirror_key(document_id: Uuid, version_number: i32, file_name: &str) -> String {
    format!("records/{document_id}/v{version_number}/{file_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_and_published_are_disjoint() {
        let id = Uuid::new_v4();
        let published = published_key(id, 3, "report.pdf");
        let draft = draft_key(id, "report.pdf");
        assert!(published.starts_with("documents/"));
        assert!(draft.starts_with("drafts/"));
        assert_ne!(published, draft);
    }
}
