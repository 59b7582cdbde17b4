//! Lifecycle state machine — rule-driven transitions and the
//! system-privileged legal-hold path.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::{ActivityLog, ActivityRecord, StorageProvider};
use docvault_database::repositories::{
    DocumentRepository, TransitionLogRepository, TransitionRuleRepository,
};
use docvault_entity::document::{Document, DocumentState, StateTransitionLog, TransitionRule};
use docvault_entity::user::UserRole;
use docvault_storage::keys;

use crate::context::RequestContext;
use crate::retention::RetentionService;

/// Drives documents through the lifecycle state graph.
///
/// Valid transitions come from an externally configured rule table; the
/// machine itself only enforces the rules and the hold protocol. Nothing
/// else in the system writes the document's state field.
#[derive(Debug, Clone)]
pub struct LifecycleService {
    /// Document repository.
    doc_repo: Arc<dyn DocumentRepository>,
    /// Transition rule table.
    rule_repo: Arc<dyn TransitionRuleRepository>,
    /// Transition log sink.
    log_repo: Arc<dyn TransitionLogRepository>,
    /// Activity log sink.
    activity: Arc<dyn ActivityLog>,
    /// Retention engine, suspended and resumed around holds.
    retention: Arc<RetentionService>,
    /// Blob storage holding published content.
    storage: Arc<dyn StorageProvider>,
    /// Write-once mirror target; `None` disables record mirroring.
    mirror: Option<Arc<dyn StorageProvider>>,
}

impl LifecycleService {
    /// Creates a new lifecycle service.
    pub fn new(
        doc_repo: Arc<dyn DocumentRepository>,
        rule_repo: Arc<dyn TransitionRuleRepository>,
        log_repo: Arc<dyn TransitionLogRepository>,
        activity: Arc<dyn ActivityLog>,
        retention: Arc<RetentionService>,
        storage: Arc<dyn StorageProvider>,
        mirror: Option<Arc<dyn StorageProvider>>,
    ) -> Self {
        Self {
            doc_repo,
            rule_repo,
            log_repo,
            activity,
            retention,
            storage,
            mirror,
        }
    }

    /// Moves a document to `target` if the rule table allows it.
    ///
    /// Documents on hold or checked out never transition through this
    /// path; holds have their own operations and checkouts must be closed
    /// first. System-only rules are likewise unreachable here.
    pub async fn transition(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        target: DocumentState,
        reason: Option<String>,
    ) -> AppResult<Document> {
        let mut document = self.load(document_id).await?;

        if document.state == DocumentState::OnHold {
            return Err(AppError::conflict(
                "Document is on hold; release the hold instead of transitioning",
            ));
        }
        if document.is_checked_out {
            return Err(AppError::conflict(
                "Document is checked out; check in or discard before transitioning",
            ));
        }

        let from = document.state;
        let rule = self
            .rule_repo
            .get_rule(from, target)
            .await?
            .ok_or_else(|| {
                AppError::validation(format!("Invalid transition from {from} to {target}"))
            })?;

        if rule.is_system_only() {
            return Err(AppError::authorization(format!(
                "Transition from {from} to {target} is reserved for system actions"
            )));
        }
        if let Some(required) = &rule.required_role {
            if !ctx.role.satisfies(required) {
                return Err(AppError::authorization(format!(
                    "Transition from {from} to {target} requires the {required} role"
                )));
            }
        }
        if rule.requires_classification && document.classification_id.is_none() {
            return Err(AppError::validation(
                "Transition requires the document to have a classification",
            ));
        }
        if rule.requires_retention_policy && document.retention_policy_id.is_none() {
            return Err(AppError::validation(
                "Transition requires the document to have a retention policy",
            ));
        }

        let now = Utc::now();
        document.state = target;
        document.state_changed_at = Some(now);
        document.state_changed_by = Some(ctx.user_id);
        match target {
            DocumentState::Record => document.record_declared_at = Some(now),
            DocumentState::Archived => document.archived_at = Some(now),
            DocumentState::Disposed => document.disposed_at = Some(now),
            _ => {}
        }

        if matches!(target, DocumentState::Record | DocumentState::Archived) {
            self.mirror_content(&document).await?;
        }

        let document = self.doc_repo.update(&document).await?;
        self.log_repo
            .append(&StateTransitionLog {
                id: Uuid::new_v4(),
                document_id: document.id,
                from_state: from,
                to_state: target,
                transitioned_by: ctx.user_id,
                transitioned_at: now,
                reason: reason.clone(),
                rule_id: Some(rule.id),
                is_system_action: false,
            })
            .await?;

        self.activity
            .record(ActivityRecord {
                action: "document.transition".into(),
                subject_type: "document".into(),
                subject_id: document.id,
                subject_name: document.name.clone(),
                detail: Some(match &reason {
                    Some(r) => format!("{from} -> {target}: {r}"),
                    None => format!("{from} -> {target}"),
                }),
                actor_id: ctx.user_id,
            })
            .await;

        info!(document_id = %document.id, %from, to = %target, "Document transitioned");
        Ok(document)
    }

    /// Forces a document onto legal hold, preserving its current state
    /// for restore and suspending its retention clocks.
    ///
    /// A system-privileged path: no rule-table entry governs it and it is
    /// never offered among the manually selectable transitions.
    pub async fn place_on_hold(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        hold_id: Uuid,
    ) -> AppResult<Document> {
        let mut document = self.load(document_id).await?;

        if document.state == DocumentState::OnHold || document.is_on_legal_hold {
            return Err(AppError::conflict("Document is already on hold"));
        }
        if document.state == DocumentState::Disposed {
            return Err(AppError::conflict(
                "Document is disposed and cannot be placed on hold",
            ));
        }

        let now = Utc::now();
        let from = document.state;
        document.previous_state = Some(from);
        document.state = DocumentState::OnHold;
        document.state_changed_at = Some(now);
        document.state_changed_by = Some(ctx.user_id);
        document.is_on_legal_hold = true;
        document.legal_hold_id = Some(hold_id);

        let document = self.doc_repo.update(&document).await?;
        self.log_repo
            .append(&StateTransitionLog {
                id: Uuid::new_v4(),
                document_id: document.id,
                from_state: from,
                to_state: DocumentState::OnHold,
                transitioned_by: ctx.user_id,
                transitioned_at: now,
                reason: Some(format!("Legal hold {hold_id} placed")),
                rule_id: None,
                is_system_action: true,
            })
            .await?;
        self.retention.suspend(document_id).await?;

        self.activity
            .record(ActivityRecord {
                action: "document.place_on_hold".into(),
                subject_type: "document".into(),
                subject_id: document.id,
                subject_name: document.name.clone(),
                detail: Some(format!("Hold {hold_id}, previous state {from}")),
                actor_id: ctx.user_id,
            })
            .await;

        warn!(document_id = %document.id, %hold_id, previous = %from, "Document placed on legal hold");
        Ok(document)
    }

    /// Releases a legal hold, restoring the exact pre-hold state
    /// (defaulting to `Active` if none was recorded) and resuming the
    /// retention clocks with their deadlines pushed out by the suspended
    /// duration.
    pub async fn release_from_hold(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<Document> {
        let mut document = self.load(document_id).await?;

        if document.state != DocumentState::OnHold {
            return Err(AppError::conflict("Document is not on hold"));
        }

        let now = Utc::now();
        let restored = document.previous_state.unwrap_or(DocumentState::Active);
        let hold_id = document.legal_hold_id;
        document.state = restored;
        document.previous_state = None;
        document.state_changed_at = Some(now);
        document.state_changed_by = Some(ctx.user_id);
        document.is_on_legal_hold = false;
        document.legal_hold_id = None;

        let document = self.doc_repo.update(&document).await?;
        self.log_repo
            .append(&StateTransitionLog {
                id: Uuid::new_v4(),
                document_id: document.id,
                from_state: DocumentState::OnHold,
                to_state: restored,
                transitioned_by: ctx.user_id,
                transitioned_at: now,
                reason: hold_id.map(|id| format!("Legal hold {id} released")),
                rule_id: None,
                is_system_action: true,
            })
            .await?;
        self.retention.resume(document_id).await?;

        self.activity
            .record(ActivityRecord {
                action: "document.release_from_hold".into(),
                subject_type: "document".into(),
                subject_id: document.id,
                subject_name: document.name.clone(),
                detail: Some(format!("Restored state {restored}")),
                actor_id: ctx.user_id,
            })
            .await;

        info!(document_id = %document.id, restored = %restored, "Legal hold released");
        Ok(document)
    }

    /// The transitions the caller may take from the document's current
    /// state: system-only rules and rules requiring a role the caller
    /// lacks are filtered out (administrators bypass the role filter).
    pub async fn allowed_transitions(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<Vec<TransitionRule>> {
        let document = self.load(document_id).await?;
        let rules = self.rule_repo.rules_from(document.state).await?;
        Ok(rules
            .into_iter()
            .filter(|rule| selectable_by(rule, ctx.role))
            .collect())
    }

    /// A document's transition history, oldest first.
    pub async fn history(&self, document_id: Uuid) -> AppResult<Vec<StateTransitionLog>> {
        self.log_repo.find_by_document(document_id).await
    }

    async fn load(&self, document_id: Uuid) -> AppResult<Document> {
        self.doc_repo
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))
    }

    /// Copy the current published blob into the write-once target, if
    /// mirroring is configured and the document has content.
    async fn mirror_content(&self, document: &Document) -> AppResult<()> {
        let Some(mirror) = &self.mirror else {
            return Ok(());
        };
        let Some(path) = &document.storage_path else {
            return Ok(());
        };
        let file_name = document
            .original_file_name
            .clone()
            .unwrap_or_else(|| "content.bin".to_string());
        let key = keys::mirror_key(document.id, document.current_version, &file_name);
        if mirror.exists(&key).await? {
            return Ok(());
        }
        let data = self.storage.get(path).await?;
        mirror.save(data, &key).await?;
        info!(document_id = %document.id, key, "Published content mirrored to write-once target");
        Ok(())
    }
}

/// Whether a rule is manually selectable by a caller with the given role.
fn selectable_by(rule: &TransitionRule, role: UserRole) -> bool {
    if rule.is_system_only() {
        return false;
    }
    match &rule.required_role {
        None => true,
        Some(required) => role.satisfies(required),
    }
}
