//! In-memory collaborators for service unit tests.
//!
//! Every repository and collaborator trait gets a `Mutex<HashMap>`-backed
//! implementation so the services run end-to-end without PostgreSQL or a
//! filesystem. `InMemoryDocumentRepository::claim_checkout` performs the
//! same compare-and-set the SQL conditional update does, which the
//! checkout exclusivity tests rely on.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::{
    ActivityLog, ActivityRecord, FileValidation, FileValidator, LegalHoldQuery, StorageProvider,
    StoredObject,
};
use docvault_database::repositories::{
    ClassificationRepository, DocumentRepository, RetentionPolicyRepository, RetentionRepository,
    TransitionLogRepository, TransitionRuleRepository, VersionRepository, WorkingCopyRepository,
};
use docvault_entity::classification::Classification;
use docvault_entity::document::{
    Document, DocumentState, DocumentVersion, DocumentWorkingCopy, StateTransitionLog,
    TransitionRule, VersionMetadataField,
};
use docvault_entity::retention::{DocumentRetention, RetentionPolicy, RetentionTriggerLog};

use crate::checkout::CheckoutService;
use crate::lifecycle::LifecycleService;
use crate::retention::RetentionService;
use crate::version::VersionService;

#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    docs: Mutex<HashMap<Uuid, Document>>,
}

impl InMemoryDocumentRepository {
    pub fn insert(&self, document: Document) {
        self.docs.lock().unwrap().insert(document.id, document);
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        Ok(self.docs.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, document: &Document) -> AppResult<Document> {
        self.docs
            .lock()
            .unwrap()
            .insert(document.id, document.clone());
        Ok(document.clone())
    }

    async fn update(&self, document: &Document) -> AppResult<Document> {
        let mut docs = self.docs.lock().unwrap();
        if !docs.contains_key(&document.id) {
            return Err(AppError::not_found("Document not found"));
        }
        docs.insert(document.id, document.clone());
        Ok(document.clone())
    }

    async fn claim_checkout(
        &self,
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        // Single critical section, matching the SQL conditional update.
        let mut docs = self.docs.lock().unwrap();
        let Some(doc) = docs.get_mut(&id) else {
            return Ok(false);
        };
        if doc.is_checked_out {
            return Ok(false);
        }
        doc.is_checked_out = true;
        doc.checked_out_by = Some(user_id);
        doc.checked_out_at = Some(at);
        Ok(true)
    }

    async fn release_checkout(&self, id: Uuid) -> AppResult<()> {
        if let Some(doc) = self.docs.lock().unwrap().get_mut(&id) {
            doc.is_checked_out = false;
            doc.checked_out_by = None;
            doc.checked_out_at = None;
        }
        Ok(())
    }

    async fn find_stale_checkouts(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Document>> {
        Ok(self
            .docs
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.is_checked_out && d.checked_out_at.is_some_and(|at| at < cutoff))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryVersionRepository {
    versions: Mutex<HashMap<Uuid, DocumentVersion>>,
    metadata: Mutex<HashMap<Uuid, Vec<VersionMetadataField>>>,
}

#[async_trait]
impl VersionRepository for InMemoryVersionRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DocumentVersion>> {
        Ok(self.versions.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_document(&self, document_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        let mut versions: Vec<_> = self
            .versions
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.document_id == document_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        Ok(versions)
    }

    async fn create(&self, version: &DocumentVersion) -> AppResult<DocumentVersion> {
        self.versions
            .lock()
            .unwrap()
            .insert(version.id, version.clone());
        Ok(version.clone())
    }

    async fn insert_metadata(&self, fields: &[VersionMetadataField]) -> AppResult<()> {
        let mut metadata = self.metadata.lock().unwrap();
        for field in fields {
            metadata
                .entry(field.version_id)
                .or_default()
                .push(field.clone());
        }
        Ok(())
    }

    async fn find_metadata(&self, version_id: Uuid) -> AppResult<Vec<VersionMetadataField>> {
        Ok(self
            .metadata
            .lock()
            .unwrap()
            .get(&version_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_integrity_verified(
        &self,
        version_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(version) = self.versions.lock().unwrap().get_mut(&version_id) {
            version.integrity_verified_at = Some(at);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryWorkingCopyRepository {
    copies: Mutex<HashMap<Uuid, DocumentWorkingCopy>>,
}

#[async_trait]
impl WorkingCopyRepository for InMemoryWorkingCopyRepository {
    async fn find_by_document(
        &self,
        document_id: Uuid,
    ) -> AppResult<Option<DocumentWorkingCopy>> {
        Ok(self.copies.lock().unwrap().get(&document_id).cloned())
    }

    async fn create(&self, copy: &DocumentWorkingCopy) -> AppResult<DocumentWorkingCopy> {
        self.copies
            .lock()
            .unwrap()
            .insert(copy.document_id, copy.clone());
        Ok(copy.clone())
    }

    async fn update(&self, copy: &DocumentWorkingCopy) -> AppResult<DocumentWorkingCopy> {
        self.copies
            .lock()
            .unwrap()
            .insert(copy.document_id, copy.clone());
        Ok(copy.clone())
    }

    async fn delete_by_document(&self, document_id: Uuid) -> AppResult<bool> {
        Ok(self.copies.lock().unwrap().remove(&document_id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTransitionRuleRepository {
    rules: Mutex<Vec<TransitionRule>>,
}

impl InMemoryTransitionRuleRepository {
    pub fn add(&self, rule: TransitionRule) {
        self.rules.lock().unwrap().push(rule);
    }
}

#[async_trait]
impl TransitionRuleRepository for InMemoryTransitionRuleRepository {
    async fn get_rule(
        &self,
        from: DocumentState,
        to: DocumentState,
    ) -> AppResult<Option<TransitionRule>> {
        Ok(self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.from_state == from && r.to_state == to)
            .cloned())
    }

    async fn rules_from(&self, from: DocumentState) -> AppResult<Vec<TransitionRule>> {
        Ok(self
            .rules
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.from_state == from)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTransitionLogRepository {
    entries: Mutex<Vec<StateTransitionLog>>,
}

impl InMemoryTransitionLogRepository {
    pub fn entries(&self) -> Vec<StateTransitionLog> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransitionLogRepository for InMemoryTransitionLogRepository {
    async fn append(&self, entry: &StateTransitionLog) -> AppResult<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn find_by_document(&self, document_id: Uuid) -> AppResult<Vec<StateTransitionLog>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.document_id == document_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRetentionRepository {
    rows: Mutex<HashMap<Uuid, DocumentRetention>>,
    trigger_log: Mutex<Vec<RetentionTriggerLog>>,
}

impl InMemoryRetentionRepository {
    pub fn trigger_log(&self) -> Vec<RetentionTriggerLog> {
        self.trigger_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl RetentionRepository for InMemoryRetentionRepository {
    async fn find_by_document(&self, document_id: Uuid) -> AppResult<Vec<DocumentRetention>> {
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.document_id == document_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn find_by_document_and_policy(
        &self,
        document_id: Uuid,
        policy_id: Uuid,
    ) -> AppResult<Option<DocumentRetention>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|r| r.document_id == document_id && r.policy_id == policy_id)
            .cloned())
    }

    async fn create(&self, retention: &DocumentRetention) -> AppResult<DocumentRetention> {
        self.rows
            .lock()
            .unwrap()
            .insert(retention.id, retention.clone());
        Ok(retention.clone())
    }

    async fn update(&self, retention: &DocumentRetention) -> AppResult<DocumentRetention> {
        self.rows
            .lock()
            .unwrap()
            .insert(retention.id, retention.clone());
        Ok(retention.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }

    async fn append_trigger_log(&self, entry: &RetentionTriggerLog) -> AppResult<()> {
        self.trigger_log.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

/// Applicable-policy scope entry: `(folder, classification, doc type)`,
/// each `None` meaning "any".
type PolicyScope = (Option<Uuid>, Option<Uuid>, Option<Uuid>, Uuid);

#[derive(Debug, Default)]
pub struct InMemoryRetentionPolicyRepository {
    policies: Mutex<HashMap<Uuid, RetentionPolicy>>,
    scopes: Mutex<Vec<PolicyScope>>,
}

impl InMemoryRetentionPolicyRepository {
    pub fn add(&self, policy: RetentionPolicy) {
        self.policies.lock().unwrap().insert(policy.id, policy);
    }

    pub fn add_scope(
        &self,
        folder_id: Option<Uuid>,
        classification_id: Option<Uuid>,
        doc_type_id: Option<Uuid>,
        policy_id: Uuid,
    ) {
        self.scopes
            .lock()
            .unwrap()
            .push((folder_id, classification_id, doc_type_id, policy_id));
    }
}

#[async_trait]
impl RetentionPolicyRepository for InMemoryRetentionPolicyRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RetentionPolicy>> {
        Ok(self.policies.lock().unwrap().get(&id).cloned())
    }

    async fn find_applicable(
        &self,
        folder_id: Option<Uuid>,
        classification_id: Option<Uuid>,
        doc_type_id: Option<Uuid>,
    ) -> AppResult<Option<RetentionPolicy>> {
        let matches_scope = |scope: &Option<Uuid>, value: Option<Uuid>| {
            scope.is_none() || *scope == value
        };
        let best = self
            .scopes
            .lock()
            .unwrap()
            .iter()
            .filter(|(f, c, t, _)| {
                (f.is_some() || c.is_some() || t.is_some())
                    && matches_scope(f, folder_id)
                    && matches_scope(c, classification_id)
                    && matches_scope(t, doc_type_id)
            })
            .max_by_key(|(f, c, t, _)| {
                f.is_some() as u8 + c.is_some() as u8 + t.is_some() as u8
            })
            .map(|(_, _, _, policy_id)| *policy_id);
        match best {
            Some(id) => Ok(self.policies.lock().unwrap().get(&id).cloned()),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryClassificationRepository {
    nodes: Mutex<HashMap<Uuid, Classification>>,
}

impl InMemoryClassificationRepository {
    pub fn add(&self, classification: Classification) {
        self.nodes
            .lock()
            .unwrap()
            .insert(classification.id, classification);
    }
}

#[async_trait]
impl ClassificationRepository for InMemoryClassificationRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Classification>> {
        Ok(self.nodes.lock().unwrap().get(&id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct RecordingActivityLog {
    records: Mutex<Vec<ActivityRecord>>,
}

impl RecordingActivityLog {
    pub fn actions(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.action.clone())
            .collect()
    }
}

#[async_trait]
impl ActivityLog for RecordingActivityLog {
    async fn record(&self, record: ActivityRecord) {
        self.records.lock().unwrap().push(record);
    }
}

#[derive(Debug, Default)]
pub struct StaticLegalHold {
    held: Mutex<HashSet<Uuid>>,
}

impl StaticLegalHold {
    pub fn hold(&self, document_id: Uuid) {
        self.held.lock().unwrap().insert(document_id);
    }
}

#[async_trait]
impl LegalHoldQuery for StaticLegalHold {
    async fn is_on_hold(&self, document_id: Uuid) -> AppResult<bool> {
        Ok(self.held.lock().unwrap().contains(&document_id))
    }
}

/// Hash-faithful in-memory blob storage.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    blobs: Mutex<HashMap<String, Bytes>>,
}

impl InMemoryStorage {
    pub fn contains(&self, path: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(path)
    }
}

#[async_trait]
impl StorageProvider for InMemoryStorage {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn save(&self, data: Bytes, key: &str) -> AppResult<StoredObject> {
        let stored = StoredObject {
            path: key.to_string(),
            content_hash: hex::encode(Sha256::digest(&data)),
            hash_algorithm: "SHA-256".to_string(),
            size_bytes: data.len() as i64,
        };
        self.blobs.lock().unwrap().insert(key.to_string(), data);
        Ok(stored)
    }

    async fn get(&self, path: &str) -> AppResult<Bytes> {
        self.blobs
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("No blob at '{path}'")))
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        Ok(self.blobs.lock().unwrap().remove(path).is_some())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.blobs.lock().unwrap().contains_key(path))
    }
}

/// Validator that accepts everything, resolving the claimed type or
/// falling back to `application/octet-stream`.
#[derive(Debug, Default)]
pub struct PermissiveValidator;

#[async_trait]
impl FileValidator for PermissiveValidator {
    async fn validate(
        &self,
        _data: &Bytes,
        _file_name: &str,
        claimed_content_type: Option<&str>,
    ) -> AppResult<FileValidation> {
        Ok(FileValidation::ok(
            claimed_content_type.unwrap_or("application/octet-stream"),
        ))
    }
}

/// All services wired over shared in-memory collaborators.
pub struct Harness {
    pub docs: Arc<InMemoryDocumentRepository>,
    pub versions: Arc<InMemoryVersionRepository>,
    pub working_copies: Arc<InMemoryWorkingCopyRepository>,
    pub rules: Arc<InMemoryTransitionRuleRepository>,
    pub transition_log: Arc<InMemoryTransitionLogRepository>,
    pub retentions: Arc<InMemoryRetentionRepository>,
    pub policies: Arc<InMemoryRetentionPolicyRepository>,
    pub classifications: Arc<InMemoryClassificationRepository>,
    pub storage: Arc<InMemoryStorage>,
    pub mirror: Arc<InMemoryStorage>,
    pub activity: Arc<RecordingActivityLog>,
    pub legal_hold: Arc<StaticLegalHold>,
    pub version_service: Arc<VersionService>,
    pub checkout_service: CheckoutService,
    pub lifecycle_service: LifecycleService,
    pub retention_service: Arc<RetentionService>,
}

impl Harness {
    pub fn new() -> Self {
        let docs = Arc::new(InMemoryDocumentRepository::default());
        let versions = Arc::new(InMemoryVersionRepository::default());
        let working_copies = Arc::new(InMemoryWorkingCopyRepository::default());
        let rules = Arc::new(InMemoryTransitionRuleRepository::default());
        let transition_log = Arc::new(InMemoryTransitionLogRepository::default());
        let retentions = Arc::new(InMemoryRetentionRepository::default());
        let policies = Arc::new(InMemoryRetentionPolicyRepository::default());
        let classifications = Arc::new(InMemoryClassificationRepository::default());
        let storage = Arc::new(InMemoryStorage::default());
        let mirror = Arc::new(InMemoryStorage::default());
        let activity = Arc::new(RecordingActivityLog::default());
        let legal_hold = Arc::new(StaticLegalHold::default());

        let version_service = Arc::new(VersionService::new(
            docs.clone(),
            versions.clone(),
            storage.clone(),
            activity.clone(),
        ));
        let checkout_service = CheckoutService::new(
            docs.clone(),
            working_copies.clone(),
            storage.clone(),
            Arc::new(PermissiveValidator),
            legal_hold.clone(),
            activity.clone(),
            version_service.clone(),
        );
        let retention_service = Arc::new(RetentionService::new(
            docs.clone(),
            retentions.clone(),
            policies.clone(),
            classifications.clone(),
            activity.clone(),
        ));
        let lifecycle_service = LifecycleService::new(
            docs.clone(),
            rules.clone(),
            transition_log.clone(),
            activity.clone(),
            retention_service.clone(),
            storage.clone(),
            Some(mirror.clone()),
        );

        Self {
            docs,
            versions,
            working_copies,
            rules,
            transition_log,
            retentions,
            policies,
            classifications,
            storage,
            mirror,
            activity,
            legal_hold,
            version_service,
            checkout_service,
            lifecycle_service,
            retention_service,
        }
    }
}

pub mod fixtures {
    use super::*;
    use docvault_entity::retention::{RetentionBasis, RetentionTrigger};
    use docvault_entity::user::UserRole;

    use crate::context::RequestContext;

    /// A fresh document in `Active` state with no versions yet.
    pub fn document() -> Document {
        let now = Utc::now();
        Document {
            id: Uuid::new_v4(),
            folder_id: Uuid::new_v4(),
            name: "Quarterly report".to_string(),
            description: None,
            classification_id: None,
            doc_type_id: None,
            importance: Some(3),
            storage_path: None,
            size_bytes: 0,
            content_hash: None,
            hash_algorithm: None,
            content_type: None,
            original_file_name: None,
            current_version: 0,
            current_major_version: 0,
            current_minor_version: 0,
            current_version_id: None,
            state: DocumentState::Active,
            previous_state: None,
            state_changed_at: None,
            state_changed_by: None,
            record_declared_at: None,
            archived_at: None,
            disposed_at: None,
            is_checked_out: false,
            checked_out_by: None,
            checked_out_at: None,
            is_on_legal_hold: false,
            legal_hold_id: None,
            retention_policy_id: None,
            metadata: None,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    /// A retention policy with the given length and basis, no triggers.
    pub fn policy(retention_days: i64, basis: RetentionBasis) -> RetentionPolicy {
        RetentionPolicy {
            id: Uuid::new_v4(),
            name: "Test policy".to_string(),
            retention_days,
            basis,
            expiration_action: "review".to_string(),
            triggers: None,
        }
    }

    /// An event-based policy configured with a single trigger type.
    pub fn event_policy(retention_days: i64, trigger_type: &str) -> RetentionPolicy {
        RetentionPolicy {
            triggers: Some(sqlx::types::Json(vec![RetentionTrigger {
                trigger_type: trigger_type.to_string(),
            }])),
            ..policy(retention_days, RetentionBasis::Event)
        }
    }

    /// A transition rule with no preconditions.
    pub fn rule(
        from: DocumentState,
        to: DocumentState,
        required_role: Option<&str>,
    ) -> TransitionRule {
        TransitionRule {
            id: Uuid::new_v4(),
            from_state: from,
            to_state: to,
            requires_classification: false,
            requires_retention_policy: false,
            required_role: required_role.map(str::to_string),
            requires_approval: false,
        }
    }

    /// A contributor-role request context.
    pub fn context() -> RequestContext {
        RequestContext::new(Uuid::new_v4(), UserRole::Contributor, "alice".to_string())
    }

    /// An admin-role request context.
    pub fn admin_context() -> RequestContext {
        RequestContext::new(Uuid::new_v4(), UserRole::Admin, "root".to_string())
    }

    /// A records-manager-role request context.
    pub fn records_manager_context() -> RequestContext {
        RequestContext::new(Uuid::new_v4(), UserRole::RecordsManager, "rm".to_string())
    }

    /// Bytes for upload fixtures.
    pub fn content(text: &str) -> crate::checkout::NewContent {
        crate::checkout::NewContent {
            data: Bytes::copy_from_slice(text.as_bytes()),
            file_name: "report.txt".to_string(),
            content_type: Some("text/plain".to_string()),
        }
    }
}
