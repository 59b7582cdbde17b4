//! Version chain service — minting, metadata snapshots, comparison,
//! restore, and integrity verification.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::{ActivityLog, ActivityRecord, StorageProvider};
use docvault_database::repositories::{DocumentRepository, VersionRepository};
use docvault_entity::document::{
    Document, DocumentVersion, VersionMetadataField, VersionType,
};

use crate::context::RequestContext;

use super::compare::{compare_snapshots, VersionComparison};

/// Everything needed to mint one new version.
///
/// Numbering (major/minor) is resolved by the caller; the dense
/// `version_number` is always the document's current counter plus one.
#[derive(Debug, Clone)]
pub struct VersionSpec {
    /// How this version advances the label.
    pub version_type: VersionType,
    /// Resolved major version.
    pub major_version: i32,
    /// Resolved minor version.
    pub minor_version: i32,
    /// Content pointer for this version.
    pub storage_path: Option<String>,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// Content hash.
    pub content_hash: Option<String>,
    /// Hash algorithm name.
    pub hash_algorithm: Option<String>,
    /// Content MIME type.
    pub content_type: Option<String>,
    /// Whether content changed relative to the predecessor.
    pub is_content_changed: bool,
    /// Whether metadata changed relative to the predecessor.
    pub is_metadata_changed: bool,
    /// What changed, per the author.
    pub change_description: Option<String>,
    /// Free-form comment.
    pub comment: Option<String>,
}

/// Options for restoring a document from a prior version.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RestoreRequest {
    /// Copy the target version's content pointer.
    pub restore_content: bool,
    /// Copy the target version's metadata snapshot.
    pub restore_metadata: bool,
    /// Comment recorded on the restore version.
    pub comment: Option<String>,
}

/// Manages the append-only version chain of every document.
#[derive(Debug, Clone)]
pub struct VersionService {
    /// Document repository.
    doc_repo: Arc<dyn DocumentRepository>,
    /// Version repository.
    version_repo: Arc<dyn VersionRepository>,
    /// Blob storage.
    storage: Arc<dyn StorageProvider>,
    /// Activity log sink.
    activity: Arc<dyn ActivityLog>,
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(
        doc_repo: Arc<dyn DocumentRepository>,
        version_repo: Arc<dyn VersionRepository>,
        storage: Arc<dyn StorageProvider>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            doc_repo,
            version_repo,
            storage,
            activity,
        }
    }

    /// Appends a new version row and advances the document's version
    /// pointers in memory.
    ///
    /// The caller persists the document in the same logical transaction
    /// and takes the metadata snapshot *after* all metadata mutations are
    /// applied; the pointer update must be the last durable step of the
    /// enclosing operation.
    pub async fn create_version(
        &self,
        document: &mut Document,
        spec: VersionSpec,
        created_by: Uuid,
    ) -> AppResult<DocumentVersion> {
        let now = Utc::now();
        let version = DocumentVersion {
            id: Uuid::new_v4(),
            document_id: document.id,
            version_number: document.current_version + 1,
            major_version: spec.major_version,
            minor_version: spec.minor_version,
            version_label: format!("{}.{}", spec.major_version, spec.minor_version),
            version_type: spec.version_type,
            storage_path: spec.storage_path,
            size_bytes: spec.size_bytes,
            content_hash: spec.content_hash,
            hash_algorithm: spec.hash_algorithm,
            content_type: spec.content_type,
            is_content_changed: spec.is_content_changed,
            is_metadata_changed: spec.is_metadata_changed,
            previous_version_id: document.current_version_id,
            change_description: spec.change_description,
            comment: spec.comment,
            created_by,
            created_at: now,
            integrity_verified_at: None,
        };

        let version = self.version_repo.create(&version).await?;

        document.current_version = version.version_number;
        document.current_major_version = version.major_version;
        document.current_minor_version = version.minor_version;
        document.current_version_id = Some(version.id);
        document.updated_at = now;

        info!(
            document_id = %document.id,
            version = version.version_number,
            label = %version.version_label,
            kind = %version.version_type,
            "Version created"
        );
        Ok(version)
    }

    /// Snapshots the document's *current* custom metadata values for the
    /// given version. Must run after all metadata mutations for the
    /// enclosing check-in or restore are applied.
    pub async fn snapshot_metadata(
        &self,
        document: &Document,
        version_id: Uuid,
    ) -> AppResult<()> {
        let fields = snapshot_fields(document, version_id);
        if fields.is_empty() {
            return Ok(());
        }
        self.version_repo.insert_metadata(&fields).await
    }

    /// Lists a document's versions, newest first.
    pub async fn list_versions(&self, document_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        self.doc_repo
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))?;
        self.version_repo.find_by_document(document_id).await
    }

    /// Compares two versions of the same document: per-field metadata
    /// diff over the union of both snapshots, plus content hash and size
    /// comparison.
    pub async fn compare(
        &self,
        version_a_id: Uuid,
        version_b_id: Uuid,
    ) -> AppResult<VersionComparison> {
        let a = self
            .version_repo
            .find_by_id(version_a_id)
            .await?
            .ok_or_else(|| AppError::not_found("Version A not found"))?;
        let b = self
            .version_repo
            .find_by_id(version_b_id)
            .await?
            .ok_or_else(|| AppError::not_found("Version B not found"))?;

        if a.document_id != b.document_id {
            return Err(AppError::validation(
                "Versions belong to different documents",
            ));
        }

        let snapshot_a = self.version_repo.find_metadata(a.id).await?;
        let snapshot_b = self.version_repo.find_metadata(b.id).await?;

        Ok(VersionComparison {
            version_a_id: a.id,
            version_b_id: b.id,
            version_a_label: a.version_label.clone(),
            version_b_label: b.version_label.clone(),
            content_changed: a.content_hash != b.content_hash,
            size_delta_bytes: b.size_bytes - a.size_bytes,
            fields: compare_snapshots(&snapshot_a, &snapshot_b),
        })
    }

    /// Restores content and/or metadata from a prior version by minting
    /// a new **Major** version. Forbidden while the document is checked
    /// out. When metadata is not restored, the new version's snapshot
    /// reflects the document's current metadata, not the target's.
    pub async fn restore(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        target_version_id: Uuid,
        req: RestoreRequest,
    ) -> AppResult<DocumentVersion> {
        let mut document = self
            .doc_repo
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))?;

        if document.is_checked_out {
            return Err(AppError::conflict(
                "Document is checked out; check in or discard before restoring",
            ));
        }

        let target = self
            .version_repo
            .find_by_id(target_version_id)
            .await?
            .ok_or_else(|| AppError::not_found("Target version not found"))?;
        if target.document_id != document_id {
            return Err(AppError::validation(
                "Target version belongs to a different document",
            ));
        }

        let content_changed =
            req.restore_content && target.content_hash != document.content_hash;
        if req.restore_content {
            document.storage_path = target.storage_path.clone();
            document.size_bytes = target.size_bytes;
            document.content_hash = target.content_hash.clone();
            document.hash_algorithm = target.hash_algorithm.clone();
            document.content_type = target.content_type.clone();
        }
        if req.restore_metadata {
            let snapshot = self.version_repo.find_metadata(target.id).await?;
            document.metadata = Some(snapshot_to_json(&snapshot));
        }

        // A restore is always a major version, never minor or overwrite.
        let spec = VersionSpec {
            version_type: VersionType::Major,
            major_version: document.current_major_version + 1,
            minor_version: 0,
            storage_path: document.storage_path.clone(),
            size_bytes: document.size_bytes,
            content_hash: document.content_hash.clone(),
            hash_algorithm: document.hash_algorithm.clone(),
            content_type: document.content_type.clone(),
            is_content_changed: content_changed,
            is_metadata_changed: req.restore_metadata,
            change_description: Some(format!(
                "Restored from version {}",
                target.version_label
            )),
            comment: req.comment.clone(),
        };

        let version = self
            .create_version(&mut document, spec, ctx.user_id)
            .await?;
        let document = self.doc_repo.update(&document).await?;
        self.snapshot_metadata(&document, version.id).await?;

        self.activity
            .record(ActivityRecord {
                action: "document.restore".into(),
                subject_type: "document".into(),
                subject_id: document.id,
                subject_name: document.name.clone(),
                detail: Some(format!(
                    "Restored from version {} (content: {}, metadata: {})",
                    target.version_label, req.restore_content, req.restore_metadata
                )),
                actor_id: ctx.user_id,
            })
            .await;

        info!(
            document_id = %document.id,
            target = %target.version_label,
            new_label = %version.version_label,
            "Document restored from prior version"
        );
        Ok(version)
    }

    /// Re-hashes a version's stored content against its recorded hash.
    /// Stamps the verification timestamp on success; a mismatch is a
    /// hard storage error.
    pub async fn verify_integrity(&self, version_id: Uuid) -> AppResult<DateTime<Utc>> {
        let version = self
            .version_repo
            .find_by_id(version_id)
            .await?
            .ok_or_else(|| AppError::not_found("Version not found"))?;

        let (path, expected) = match (&version.storage_path, &version.content_hash) {
            (Some(p), Some(h)) => (p.clone(), h.clone()),
            _ => {
                return Err(AppError::validation(
                    "Version has no stored content to verify",
                ));
            }
        };

        let data: Bytes = self.storage.get(&path).await?;
        let actual = hex::encode(Sha256::digest(&data));
        if !actual.eq_ignore_ascii_case(&expected) {
            return Err(AppError::storage(format!(
                "Content hash mismatch for version {}: expected {expected}, got {actual}",
                version.version_label
            )));
        }

        let now = Utc::now();
        self.version_repo
            .set_integrity_verified(version_id, now)
            .await?;
        Ok(now)
    }
}

/// Build snapshot rows from the document's custom metadata JSON object.
fn snapshot_fields(document: &Document, version_id: Uuid) -> Vec<VersionMetadataField> {
    let Some(serde_json::Value::Object(map)) = &document.metadata else {
        return Vec::new();
    };
    map.iter()
        .map(|(key, value)| VersionMetadataField::from_json(version_id, key, value))
        .collect()
}

/// Rebuild a metadata JSON object from a version's snapshot rows.
fn snapshot_to_json(fields: &[VersionMetadataField]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for field in fields {
        let value = if let Some(text) = &field.text_value {
            serde_json::Value::String(text.clone())
        } else if let Some(num) = field.numeric_value {
            serde_json::Number::from_f64(num)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null)
        } else if let Some(date) = field.date_value {
            serde_json::Value::String(date.to_rfc3339())
        } else {
            serde_json::Value::Null
        };
        map.insert(field.field_key.clone(), value);
    }
    serde_json::Value::Object(map)
}
