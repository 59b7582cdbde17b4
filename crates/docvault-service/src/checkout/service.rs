//! Checkout service — the working-copy lifecycle.
//!
//! The checkout flag on the document row is an advisory single-writer
//! lock. Claiming it goes through a single-row conditional update in the
//! repository, so two concurrent checkouts cannot both win.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::{
    ActivityLog, ActivityRecord, FileValidator, LegalHoldQuery, StorageProvider,
};
use docvault_core::types::Patch;
use docvault_database::repositories::{DocumentRepository, WorkingCopyRepository};
use docvault_entity::document::{Document, DocumentVersion, DocumentWorkingCopy};
use docvault_storage::keys;

use crate::context::RequestContext;
use crate::version::{VersionService, VersionSpec};

use super::checkin::{
    apply_draft_metadata, metadata_changed, next_label, resolve_content_source, CheckInRequest,
    ContentSource, NewContent,
};

/// Partial update of a working copy's draft metadata.
///
/// Absent fields are untouched; explicit nulls clear the target. The
/// name cannot be cleared, so it is a plain option.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftMetadataUpdate {
    /// New draft name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Draft description patch.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub description: Patch<String>,
    /// Draft classification patch.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub classification_id: Patch<Uuid>,
    /// Draft document type patch.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub doc_type_id: Patch<Uuid>,
    /// Draft importance patch.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub importance: Patch<i32>,
    /// Draft custom metadata patch (opaque JSON object).
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub metadata: Patch<serde_json::Value>,
}

/// Owns the checkout/working-copy protocol.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    /// Document repository.
    doc_repo: Arc<dyn DocumentRepository>,
    /// Working copy repository.
    wc_repo: Arc<dyn WorkingCopyRepository>,
    /// Blob storage.
    storage: Arc<dyn StorageProvider>,
    /// Upload validator.
    validator: Arc<dyn FileValidator>,
    /// Legal-hold query.
    legal_hold: Arc<dyn LegalHoldQuery>,
    /// Activity log sink.
    activity: Arc<dyn ActivityLog>,
    /// Version chain service, used to mint the version at check-in.
    versions: Arc<VersionService>,
}

impl CheckoutService {
    /// Creates a new checkout service.
    pub fn new(
        doc_repo: Arc<dyn DocumentRepository>,
        wc_repo: Arc<dyn WorkingCopyRepository>,
        storage: Arc<dyn StorageProvider>,
        validator: Arc<dyn FileValidator>,
        legal_hold: Arc<dyn LegalHoldQuery>,
        activity: Arc<dyn ActivityLog>,
        versions: Arc<VersionService>,
    ) -> Self {
        Self {
            doc_repo,
            wc_repo,
            storage,
            validator,
            legal_hold,
            activity,
            versions,
        }
    }

    /// Claims the exclusive checkout and creates a working copy
    /// mirroring the document's current metadata.
    pub async fn check_out(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<DocumentWorkingCopy> {
        let document = self.load(document_id).await?;

        if document.is_on_legal_hold || self.legal_hold.is_on_hold(document_id).await? {
            return Err(AppError::conflict(
                "Document is on legal hold and cannot be edited",
            ));
        }
        if document.is_checked_out {
            return Err(self.already_checked_out_error(&document, ctx.user_id));
        }

        let now = Utc::now();
        // Conditional single-row update; losing the race surfaces here.
        if !self
            .doc_repo
            .claim_checkout(document_id, ctx.user_id, now)
            .await?
        {
            return Err(AppError::conflict(
                "Document is checked out by another user",
            ));
        }

        let working_copy = DocumentWorkingCopy::mirroring(&document, ctx.user_id, now);
        let working_copy = self.wc_repo.create(&working_copy).await?;

        self.activity
            .record(ActivityRecord {
                action: "document.check_out".into(),
                subject_type: "document".into(),
                subject_id: document.id,
                subject_name: document.name.clone(),
                detail: None,
                actor_id: ctx.user_id,
            })
            .await;

        info!(document_id = %document.id, user_id = %ctx.user_id, "Document checked out");
        Ok(working_copy)
    }

    /// Applies a partial metadata update to the working copy. Only the
    /// checkout owner may stage drafts.
    pub async fn save_draft_metadata(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        update: DraftMetadataUpdate,
    ) -> AppResult<DocumentWorkingCopy> {
        let document = self.load_owned(document_id, ctx.user_id).await?;
        let mut working_copy = self.load_or_create_working_copy(&document, ctx.user_id).await?;

        if let Some(name) = update.name {
            working_copy.draft_name = Some(name);
        }
        update.description.apply_to(&mut working_copy.draft_description);
        update
            .classification_id
            .apply_to(&mut working_copy.draft_classification_id);
        update.doc_type_id.apply_to(&mut working_copy.draft_doc_type_id);
        update.importance.apply_to(&mut working_copy.draft_importance);
        update.metadata.apply_to(&mut working_copy.draft_metadata);
        working_copy.updated_at = Utc::now();

        self.wc_repo.update(&working_copy).await
    }

    /// Validates and stages draft content in the draft storage slot,
    /// replacing any previously staged draft blob.
    pub async fn save_draft_content(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        content: NewContent,
    ) -> AppResult<DocumentWorkingCopy> {
        let document = self.load_owned(document_id, ctx.user_id).await?;
        let mut working_copy = self.load_or_create_working_copy(&document, ctx.user_id).await?;

        let validation = self
            .validator
            .validate(&content.data, &content.file_name, content.content_type.as_deref())
            .await?;
        if !validation.valid {
            return Err(AppError::validation(
                validation
                    .error
                    .unwrap_or_else(|| "File validation failed".to_string()),
            ));
        }
        if let Some(warning) = &validation.warning {
            warn!(document_id = %document.id, warning, "Draft content validation warning");
        }

        if let Some(previous) = &working_copy.draft_storage_path {
            self.storage.delete(previous).await?;
        }

        let key = keys::draft_key(document.id, &content.file_name);
        let stored = self.storage.save(content.data, &key).await?;

        working_copy.draft_storage_path = Some(stored.path);
        working_copy.draft_size_bytes = Some(stored.size_bytes);
        working_copy.draft_content_hash = Some(stored.content_hash);
        working_copy.draft_content_type = validation
            .resolved_content_type
            .or(content.content_type);
        working_copy.draft_original_file_name = Some(content.file_name);
        working_copy.updated_at = Utc::now();

        let working_copy = self.wc_repo.update(&working_copy).await?;
        info!(document_id = %document.id, "Draft content staged");
        Ok(working_copy)
    }

    /// Publishes the draft as a new official version.
    ///
    /// Resolves numbering, content source precedence (inline upload over
    /// staged draft over unchanged), and changed flags; mints the version
    /// through the version chain; applies draft metadata; then tears the
    /// checkout down unless `keep_checked_out` resets the working copy
    /// for a new edit session instead.
    pub async fn check_in(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        new_content: Option<NewContent>,
        request: CheckInRequest,
    ) -> AppResult<DocumentVersion> {
        let mut document = self.load_owned(document_id, ctx.user_id).await?;
        let found = self.wc_repo.find_by_document(document_id).await?;
        let had_working_copy = found.is_some();
        // Checkouts predating working copies behave as an untouched draft.
        let working_copy = match found {
            Some(wc) => wc,
            None => DocumentWorkingCopy::mirroring(&document, ctx.user_id, Utc::now()),
        };

        let source = resolve_content_source(new_content.is_some(), Some(&working_copy));
        let is_metadata_changed = metadata_changed(&document, &working_copy);
        let is_content_changed = source != ContentSource::Unchanged;
        let (major, minor) = next_label(
            document.current_major_version,
            document.current_minor_version,
            request.version_type,
        );
        let next_number = document.current_version + 1;

        // Resolve the authoritative content pointer before any state is
        // mutated; a storage failure here aborts the whole check-in.
        match (source, new_content) {
            (ContentSource::Inline, Some(content)) => {
                let validation = self
                    .validator
                    .validate(&content.data, &content.file_name, content.content_type.as_deref())
                    .await?;
                if !validation.valid {
                    return Err(AppError::validation(
                        validation
                            .error
                            .unwrap_or_else(|| "File validation failed".to_string()),
                    ));
                }
                let key = keys::published_key(document.id, next_number, &content.file_name);
                let stored = self.storage.save(content.data, &key).await?;
                document.storage_path = Some(stored.path);
                document.size_bytes = stored.size_bytes;
                document.content_hash = Some(stored.content_hash);
                document.hash_algorithm = Some(stored.hash_algorithm);
                document.content_type =
                    validation.resolved_content_type.or(content.content_type);
                document.original_file_name = Some(content.file_name);
            }
            (ContentSource::Draft, _) => {
                let draft_path = working_copy
                    .draft_storage_path
                    .clone()
                    .ok_or_else(|| AppError::internal("Draft content pointer is missing"))?;
                let file_name = working_copy
                    .draft_original_file_name
                    .clone()
                    .or_else(|| document.original_file_name.clone())
                    .unwrap_or_else(|| "content.bin".to_string());
                let data = self.storage.get(&draft_path).await?;
                let key = keys::published_key(document.id, next_number, &file_name);
                let stored = self.storage.save(data, &key).await?;
                self.storage.delete(&draft_path).await?;
                document.storage_path = Some(stored.path);
                document.size_bytes = stored.size_bytes;
                document.content_hash = Some(stored.content_hash);
                document.hash_algorithm = Some(stored.hash_algorithm);
                document.content_type = working_copy.draft_content_type.clone();
                document.original_file_name = Some(file_name);
            }
            _ => {}
        }

        apply_draft_metadata(&mut document, &working_copy);

        let spec = VersionSpec {
            version_type: request.version_type,
            major_version: major,
            minor_version: minor,
            storage_path: document.storage_path.clone(),
            size_bytes: document.size_bytes,
            content_hash: document.content_hash.clone(),
            hash_algorithm: document.hash_algorithm.clone(),
            content_type: document.content_type.clone(),
            is_content_changed,
            is_metadata_changed,
            change_description: request.change_description.clone(),
            comment: request.comment.clone(),
        };
        let version = self
            .versions
            .create_version(&mut document, spec, ctx.user_id)
            .await?;

        if !request.keep_checked_out {
            document.is_checked_out = false;
            document.checked_out_by = None;
            document.checked_out_at = None;
        }
        let document = self.doc_repo.update(&document).await?;
        self.versions.snapshot_metadata(&document, version.id).await?;

        if request.keep_checked_out {
            let mut fresh = working_copy;
            fresh.reset_from(&document, Utc::now());
            if had_working_copy {
                self.wc_repo.update(&fresh).await?;
            } else {
                self.wc_repo.create(&fresh).await?;
            }
        } else {
            self.wc_repo.delete_by_document(document_id).await?;
        }

        self.activity
            .record(ActivityRecord {
                action: "document.check_in".into(),
                subject_type: "document".into(),
                subject_id: document.id,
                subject_name: document.name.clone(),
                detail: Some(format!(
                    "Version {} ({}), content changed: {}, metadata changed: {}",
                    version.version_label,
                    version.version_type,
                    is_content_changed,
                    is_metadata_changed
                )),
                actor_id: ctx.user_id,
            })
            .await;

        info!(
            document_id = %document.id,
            version = version.version_number,
            label = %version.version_label,
            keep_checked_out = request.keep_checked_out,
            "Document checked in"
        );
        Ok(version)
    }

    /// Drops the draft and releases the checkout, leaving the published
    /// document exactly as it was before checkout. Owner-only.
    pub async fn discard(&self, ctx: &RequestContext, document_id: Uuid) -> AppResult<Document> {
        let document = self.load_owned(document_id, ctx.user_id).await?;
        self.teardown(&document).await?;

        self.activity
            .record(ActivityRecord {
                action: "document.discard_checkout".into(),
                subject_type: "document".into(),
                subject_id: document.id,
                subject_name: document.name.clone(),
                detail: None,
                actor_id: ctx.user_id,
            })
            .await;

        info!(document_id = %document.id, user_id = %ctx.user_id, "Checkout discarded");
        self.load(document_id).await
    }

    /// Administrative override: discards another user's checkout,
    /// recording the original owner and the override reason for audit.
    pub async fn force_discard(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        reason: &str,
    ) -> AppResult<Document> {
        if !ctx.is_admin() {
            return Err(AppError::authorization(
                "Administrator role required to force-discard a checkout",
            ));
        }

        let document = self.load(document_id).await?;
        if !document.is_checked_out {
            return Err(AppError::conflict("Document is not checked out"));
        }
        let original_owner = document.checked_out_by;

        self.teardown(&document).await?;

        self.activity
            .record(ActivityRecord {
                action: "document.force_discard_checkout".into(),
                subject_type: "document".into(),
                subject_id: document.id,
                subject_name: document.name.clone(),
                detail: Some(format!(
                    "Original owner: {}; reason: {reason}",
                    original_owner.map_or_else(|| "unknown".to_string(), |id| id.to_string())
                )),
                actor_id: ctx.user_id,
            })
            .await;

        warn!(
            document_id = %document.id,
            admin = %ctx.user_id,
            original_owner = ?original_owner,
            reason,
            "Checkout force-discarded"
        );
        self.load(document_id).await
    }

    /// Documents checked out longer than `stale_hours` ago. Read-only;
    /// reclaiming a stale checkout is an operator decision, never
    /// automatic.
    pub async fn stale_checkouts(&self, stale_hours: i64) -> AppResult<Vec<Document>> {
        let cutoff = Utc::now() - Duration::hours(stale_hours);
        self.doc_repo.find_stale_checkouts(cutoff).await
    }

    async fn load(&self, document_id: Uuid) -> AppResult<Document> {
        self.doc_repo
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))
    }

    async fn load_owned(&self, document_id: Uuid, user_id: Uuid) -> AppResult<Document> {
        let document = self.load(document_id).await?;
        if !document.is_checked_out {
            return Err(AppError::conflict("Document is not checked out"));
        }
        if document.checked_out_by != Some(user_id) {
            return Err(AppError::authorization(
                "Document is checked out by another user",
            ));
        }
        Ok(document)
    }

    /// Working copies are created at checkout, but a checkout that
    /// predates working copies may lack one; create it lazily.
    async fn load_or_create_working_copy(
        &self,
        document: &Document,
        user_id: Uuid,
    ) -> AppResult<DocumentWorkingCopy> {
        match self.wc_repo.find_by_document(document.id).await? {
            Some(wc) => Ok(wc),
            None => {
                let wc = DocumentWorkingCopy::mirroring(document, user_id, Utc::now());
                self.wc_repo.create(&wc).await
            }
        }
    }

    /// Delete the draft blob and working copy, then release the checkout.
    async fn teardown(&self, document: &Document) -> AppResult<()> {
        if let Some(wc) = self.wc_repo.find_by_document(document.id).await? {
            if let Some(draft_path) = &wc.draft_storage_path {
                self.storage.delete(draft_path).await?;
            }
            self.wc_repo.delete_by_document(document.id).await?;
        }
        self.doc_repo.release_checkout(document.id).await
    }

    fn already_checked_out_error(&self, document: &Document, user_id: Uuid) -> AppError {
        if document.checked_out_by == Some(user_id) {
            AppError::conflict("Document is already checked out by you")
        } else {
            AppError::conflict("Document is checked out by another user")
        }
    }
}
