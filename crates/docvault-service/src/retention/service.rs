//! Retention engine — policy application, event triggers, classification
//! defaults, and hold suspension math.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::{ActivityLog, ActivityRecord};
use docvault_database::repositories::{
    ClassificationRepository, DocumentRepository, RetentionPolicyRepository, RetentionRepository,
};
use docvault_entity::document::Document;
use docvault_entity::retention::{
    DocumentRetention, RetentionBasis, RetentionPolicy, RetentionStatus, RetentionTriggerLog,
};

use crate::context::RequestContext;

/// Computes and maintains per-document retention rows.
///
/// The disposal process that consumes expiration dates is external; this
/// service only keeps the dates correct, including around legal holds.
#[derive(Debug, Clone)]
pub struct RetentionService {
    /// Document repository.
    doc_repo: Arc<dyn DocumentRepository>,
    /// Retention row repository.
    retention_repo: Arc<dyn RetentionRepository>,
    /// Policy configuration.
    policy_repo: Arc<dyn RetentionPolicyRepository>,
    /// Classification hierarchy.
    classification_repo: Arc<dyn ClassificationRepository>,
    /// Activity log sink.
    activity: Arc<dyn ActivityLog>,
}

impl RetentionService {
    /// Creates a new retention service.
    pub fn new(
        doc_repo: Arc<dyn DocumentRepository>,
        retention_repo: Arc<dyn RetentionRepository>,
        policy_repo: Arc<dyn RetentionPolicyRepository>,
        classification_repo: Arc<dyn ClassificationRepository>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            doc_repo,
            retention_repo,
            policy_repo,
            classification_repo,
            activity,
        }
    }

    /// Applies a retention policy to a document, replacing any existing
    /// row for the same policy.
    ///
    /// The start date follows the policy basis: record declaration (falling
    /// back to creation if the document was never declared), creation, or —
    /// for event-based policies — no start at all: the row waits in
    /// `AwaitingTrigger` until [`Self::fire_trigger_event`] starts the
    /// clock. A `retention_days` of zero means permanent: the row is
    /// `Active` with a perpetually null expiration.
    pub async fn apply_policy(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        policy_id: Uuid,
    ) -> AppResult<DocumentRetention> {
        let mut document = self.load(document_id).await?;
        let policy = self
            .policy_repo
            .find_by_id(policy_id)
            .await?
            .ok_or_else(|| AppError::not_found("Retention policy not found"))?;

        let now = Utc::now();
        let retention = build_retention(&document, &policy, now);

        if let Some(existing) = self
            .retention_repo
            .find_by_document_and_policy(document_id, policy_id)
            .await?
        {
            self.retention_repo.delete(existing.id).await?;
        }
        let retention = self.retention_repo.create(&retention).await?;

        document.retention_policy_id = Some(policy.id);
        document.updated_at = now;
        self.doc_repo.update(&document).await?;

        self.activity
            .record(ActivityRecord {
                action: "retention.apply_policy".into(),
                subject_type: "document".into(),
                subject_id: document.id,
                subject_name: document.name.clone(),
                detail: Some(format!(
                    "Policy '{}' applied ({}), expires: {}",
                    policy.name,
                    policy.basis,
                    retention
                        .expiration_date
                        .map_or_else(|| "never/pending".to_string(), |d| d.to_rfc3339())
                )),
                actor_id: ctx.user_id,
            })
            .await;

        info!(
            document_id = %document.id,
            policy_id = %policy.id,
            status = %retention.status,
            "Retention policy applied"
        );
        Ok(retention)
    }

    /// Starts the clock on every `AwaitingTrigger` retention row whose
    /// policy configures a trigger matching `trigger_type`.
    ///
    /// Rows without a matching trigger configuration are left untouched,
    /// so re-firing the same event is an idempotent no-op. Each started
    /// row gets an immutable trigger-log entry recording the expiration
    /// change.
    pub async fn fire_trigger_event(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        trigger_type: &str,
    ) -> AppResult<Vec<DocumentRetention>> {
        let document = self.load(document_id).await?;
        let rows = self.retention_repo.find_by_document(document_id).await?;
        let now = Utc::now();
        let mut started = Vec::new();

        for mut row in rows {
            if row.status != RetentionStatus::AwaitingTrigger {
                continue;
            }
            let Some(policy) = self.policy_repo.find_by_id(row.policy_id).await? else {
                warn!(retention_id = %row.id, policy_id = %row.policy_id, "Retention row references a missing policy");
                continue;
            };
            if policy.matching_trigger(trigger_type).is_none() {
                continue;
            }

            let previous_expiration = row.expiration_date;
            row.retention_start_date = Some(now);
            row.expiration_date = expiration_from(&policy, now);
            row.original_expiration_date = row.expiration_date;
            row.status = RetentionStatus::Active;
            row.updated_at = now;

            let log_entry = RetentionTriggerLog {
                id: Uuid::new_v4(),
                retention_id: row.id,
                trigger_type: trigger_type.to_string(),
                previous_expiration,
                new_expiration: row.expiration_date,
                fired_by: ctx.user_id,
                fired_at: now,
            };
            // The row points back at the log entry that started its clock.
            row.trigger_event_id = Some(log_entry.id);
            self.retention_repo.append_trigger_log(&log_entry).await?;
            started.push(self.retention_repo.update(&row).await?);
        }

        if !started.is_empty() {
            self.activity
                .record(ActivityRecord {
                    action: "retention.trigger_fired".into(),
                    subject_type: "document".into(),
                    subject_id: document.id,
                    subject_name: document.name.clone(),
                    detail: Some(format!(
                        "Event '{trigger_type}' started {} retention clock(s)",
                        started.len()
                    )),
                    actor_id: ctx.user_id,
                })
                .await;
            info!(
                document_id = %document.id,
                trigger_type,
                started = started.len(),
                "Retention trigger fired"
            );
        }
        Ok(started)
    }

    /// Reapplies retention after a classification change.
    ///
    /// Walks the classification parent chain from the new classification;
    /// the first ancestor (inclusive) carrying a default retention policy
    /// wins. No ancestor defining one is a successful no-op.
    pub async fn recalculate_on_classification_change(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        new_classification_id: Uuid,
    ) -> AppResult<Option<DocumentRetention>> {
        match self.default_policy_for(new_classification_id).await? {
            Some(policy_id) => self
                .apply_policy(ctx, document_id, policy_id)
                .await
                .map(Some),
            None => Ok(None),
        }
    }

    /// Applies whatever retention policy fits the document, if any.
    ///
    /// The exact applicable-policy lookup (folder, classification, document
    /// type) is tried first; the classification-hierarchy default walk is
    /// the fallback. Finding nothing is a successful no-op.
    pub async fn auto_apply(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<Option<DocumentRetention>> {
        let document = self.load(document_id).await?;

        if let Some(policy) = self
            .policy_repo
            .find_applicable(
                Some(document.folder_id),
                document.classification_id,
                document.doc_type_id,
            )
            .await?
        {
            return self
                .apply_policy(ctx, document_id, policy.id)
                .await
                .map(Some);
        }

        match document.classification_id {
            Some(classification_id) => {
                self.recalculate_on_classification_change(ctx, document_id, classification_id)
                    .await
            }
            None => Ok(None),
        }
    }

    /// Suspends every active retention row of a document, driven by
    /// legal-hold placement. The live expiration is left where it is; the
    /// resume path pushes it out by the suspended duration.
    pub async fn suspend(&self, document_id: Uuid) -> AppResult<usize> {
        let now = Utc::now();
        let mut count = 0;
        for mut row in self.retention_repo.find_by_document(document_id).await? {
            if row.status != RetentionStatus::Active {
                continue;
            }
            row.status = RetentionStatus::OnHold;
            row.suspended_at = Some(now);
            row.updated_at = now;
            self.retention_repo.update(&row).await?;
            count += 1;
        }
        if count > 0 {
            info!(document_id = %document_id, count, "Retention suspended");
        }
        Ok(count)
    }

    /// Resumes suspended retention rows, extending the live expiration by
    /// exactly the suspended duration so a hold never makes a document
    /// disposal-eligible earlier. `original_expiration_date` is never
    /// moved.
    pub async fn resume(&self, document_id: Uuid) -> AppResult<usize> {
        let now = Utc::now();
        let mut count = 0;
        for mut row in self.retention_repo.find_by_document(document_id).await? {
            if row.status != RetentionStatus::OnHold {
                continue;
            }
            let Some(suspended_at) = row.suspended_at else {
                warn!(retention_id = %row.id, "Suspended retention row has no suspension timestamp");
                continue;
            };
            let elapsed_days = (now - suspended_at).num_days().max(0);
            row.suspended_days += elapsed_days;
            if let Some(expiration) = row.expiration_date {
                row.expiration_date = Some(expiration + Duration::days(elapsed_days));
            }
            row.suspended_at = None;
            row.status = RetentionStatus::Active;
            row.updated_at = now;
            self.retention_repo.update(&row).await?;
            count += 1;
        }
        if count > 0 {
            info!(document_id = %document_id, count, "Retention resumed");
        }
        Ok(count)
    }

    /// All retention rows of a document.
    pub async fn retentions_for(&self, document_id: Uuid) -> AppResult<Vec<DocumentRetention>> {
        self.retention_repo.find_by_document(document_id).await
    }

    async fn load(&self, document_id: Uuid) -> AppResult<Document> {
        self.doc_repo
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))
    }

    /// First default policy found on the classification parent chain,
    /// starting at (and including) the given classification. Guards
    /// against cycles in misconfigured hierarchies.
    async fn default_policy_for(&self, classification_id: Uuid) -> AppResult<Option<Uuid>> {
        let mut visited = HashSet::new();
        let mut cursor = Some(classification_id);
        while let Some(id) = cursor {
            if !visited.insert(id) {
                warn!(classification_id = %id, "Classification hierarchy contains a cycle");
                return Ok(None);
            }
            let Some(classification) = self.classification_repo.find_by_id(id).await? else {
                return Ok(None);
            };
            if let Some(policy_id) = classification.default_retention_policy_id {
                return Ok(Some(policy_id));
            }
            cursor = classification.parent_id;
        }
        Ok(None)
    }
}

/// Build the retention row for one policy application.
fn build_retention(
    document: &Document,
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> DocumentRetention {
    let (start, expiration, status) = match policy.basis {
        RetentionBasis::Event => (None, None, RetentionStatus::AwaitingTrigger),
        RetentionBasis::RecordDeclaration => {
            let start = document.record_declared_at.unwrap_or(document.created_at);
            (Some(start), expiration_from(policy, start), RetentionStatus::Active)
        }
        RetentionBasis::Creation => {
            let start = document.created_at;
            (Some(start), expiration_from(policy, start), RetentionStatus::Active)
        }
    };

    DocumentRetention {
        id: Uuid::new_v4(),
        document_id: document.id,
        policy_id: policy.id,
        retention_start_date: start,
        expiration_date: expiration,
        original_expiration_date: expiration,
        status,
        suspended_at: None,
        suspended_days: 0,
        trigger_event_id: None,
        created_at: now,
        updated_at: now,
    }
}

/// Expiration for a started clock; permanent policies never expire.
fn expiration_from(policy: &RetentionPolicy, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if policy.is_permanent() {
        None
    } else {
        Some(start + Duration::days(policy.retention_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, Harness};
    use docvault_entity::classification::Classification;

    #[tokio::test]
    async fn test_apply_policy_sets_dates_and_replaces_prior_row() {
        let h = Harness::new();
        let document = fixtures::document();
        let id = document.id;
        let created_at = document.created_at;
        h.docs.insert(document);

        let policy = fixtures::policy(30, RetentionBasis::Creation);
        h.policies.add(policy.clone());
        let ctx = fixtures::records_manager_context();

        let row = h
            .retention_service
            .apply_policy(&ctx, id, policy.id)
            .await
            .unwrap();
        assert_eq!(row.status, RetentionStatus::Active);
        assert_eq!(row.retention_start_date, Some(created_at));
        assert_eq!(row.expiration_date, Some(created_at + Duration::days(30)));
        assert_eq!(row.original_expiration_date, row.expiration_date);

        let document = h.docs.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(document.retention_policy_id, Some(policy.id));

        // Reapplying the same policy replaces the row instead of stacking.
        h.retention_service
            .apply_policy(&ctx, id, policy.id)
            .await
            .unwrap();
        let rows = h.retention_service.retentions_for(id).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_trigger_event_starts_awaiting_clocks_idempotently() {
        let h = Harness::new();
        let document = fixtures::document();
        let id = document.id;
        h.docs.insert(document);

        let policy = fixtures::event_policy(90, "contract.terminated");
        h.policies.add(policy.clone());
        let ctx = fixtures::records_manager_context();

        let row = h
            .retention_service
            .apply_policy(&ctx, id, policy.id)
            .await
            .unwrap();
        assert_eq!(row.status, RetentionStatus::AwaitingTrigger);
        assert_eq!(row.expiration_date, None);

        // A non-matching event leaves the row untouched.
        let started = h
            .retention_service
            .fire_trigger_event(&ctx, id, "contract.renewed")
            .await
            .unwrap();
        assert!(started.is_empty());

        let started = h
            .retention_service
            .fire_trigger_event(&ctx, id, "contract.terminated")
            .await
            .unwrap();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].status, RetentionStatus::Active);
        let expiration = started[0].expiration_date.unwrap();
        assert_eq!(
            expiration,
            started[0].retention_start_date.unwrap() + Duration::days(90)
        );

        let log = h.retentions.trigger_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].previous_expiration, None);
        assert_eq!(log[0].new_expiration, Some(expiration));
        assert_eq!(started[0].trigger_event_id, Some(log[0].id));

        // The clock is running now; re-firing is a no-op.
        let started = h
            .retention_service
            .fire_trigger_event(&ctx, id, "contract.terminated")
            .await
            .unwrap();
        assert!(started.is_empty());
        assert_eq!(h.retentions.trigger_log().len(), 1);
    }

    #[tokio::test]
    async fn test_classification_walk_finds_ancestor_default() {
        let h = Harness::new();
        let document = fixtures::document();
        let id = document.id;
        h.docs.insert(document);

        let policy = fixtures::policy(180, RetentionBasis::Creation);
        h.policies.add(policy.clone());

        let parent_id = Uuid::new_v4();
        let child_id = Uuid::new_v4();
        h.classifications.add(Classification {
            id: parent_id,
            name: "Finance".to_string(),
            parent_id: None,
            default_retention_policy_id: Some(policy.id),
        });
        h.classifications.add(Classification {
            id: child_id,
            name: "Invoices".to_string(),
            parent_id: Some(parent_id),
            default_retention_policy_id: None,
        });

        let ctx = fixtures::records_manager_context();
        let row = h
            .retention_service
            .recalculate_on_classification_change(&ctx, id, child_id)
            .await
            .unwrap()
            .expect("ancestor default should apply");
        assert_eq!(row.policy_id, policy.id);
    }

    #[tokio::test]
    async fn test_classification_walk_without_default_is_noop() {
        let h = Harness::new();
        let document = fixtures::document();
        let id = document.id;
        h.docs.insert(document);

        let orphan = Uuid::new_v4();
        h.classifications.add(Classification {
            id: orphan,
            name: "Misc".to_string(),
            parent_id: None,
            default_retention_policy_id: None,
        });

        let ctx = fixtures::records_manager_context();
        let result = h
            .retention_service
            .recalculate_on_classification_change(&ctx, id, orphan)
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(h.retention_service.retentions_for(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_auto_apply_prefers_exact_scope_over_hierarchy() {
        let h = Harness::new();
        let mut document = fixtures::document();
        let classification_id = Uuid::new_v4();
        document.classification_id = Some(classification_id);
        let id = document.id;
        let folder_id = document.folder_id;
        h.docs.insert(document);

        let hierarchy_policy = fixtures::policy(30, RetentionBasis::Creation);
        let scoped_policy = fixtures::policy(365, RetentionBasis::Creation);
        h.policies.add(hierarchy_policy.clone());
        h.policies.add(scoped_policy.clone());
        h.policies
            .add_scope(Some(folder_id), None, None, scoped_policy.id);
        h.classifications.add(Classification {
            id: classification_id,
            name: "Contracts".to_string(),
            parent_id: None,
            default_retention_policy_id: Some(hierarchy_policy.id),
        });

        let ctx = fixtures::records_manager_context();
        let row = h
            .retention_service
            .auto_apply(&ctx, id)
            .await
            .unwrap()
            .expect("scoped policy should apply");
        assert_eq!(row.policy_id, scoped_policy.id);
    }

    #[tokio::test]
    async fn test_suspend_resume_pushes_deadline_by_suspended_days() {
        let h = Harness::new();
        let document = fixtures::document();
        let id = document.id;
        h.docs.insert(document);

        let policy = fixtures::policy(365, RetentionBasis::Creation);
        h.policies.add(policy.clone());
        let ctx = fixtures::records_manager_context();
        let row = h
            .retention_service
            .apply_policy(&ctx, id, policy.id)
            .await
            .unwrap();
        let original = row.original_expiration_date.unwrap();

        assert_eq!(h.retention_service.suspend(id).await.unwrap(), 1);

        // Backdate the suspension so a measurable duration elapses.
        let mut suspended = h.retention_service.retentions_for(id).await.unwrap().remove(0);
        suspended.suspended_at = Some(Utc::now() - Duration::days(10));
        h.retentions.update(&suspended).await.unwrap();

        assert_eq!(h.retention_service.resume(id).await.unwrap(), 1);
        let resumed = h.retention_service.retentions_for(id).await.unwrap().remove(0);
        assert_eq!(resumed.status, RetentionStatus::Active);
        assert_eq!(resumed.suspended_at, None);
        assert_eq!(resumed.suspended_days, 10);
        assert_eq!(
            resumed.expiration_date,
            Some(original + Duration::days(10))
        );
        // The audit baseline never moves.
        assert_eq!(resumed.original_expiration_date, Some(original));
    }

    #[test]
    fn test_permanent_policy_is_active_without_expiration() {
        let document = fixtures::document();
        let policy = fixtures::policy(0, RetentionBasis::Creation);
        let row = build_retention(&document, &policy, Utc::now());
        assert_eq!(row.status, RetentionStatus::Active);
        assert_eq!(row.expiration_date, None);
        assert_eq!(row.original_expiration_date, None);
    }

    #[test]
    fn test_event_basis_awaits_trigger() {
        let document = fixtures::document();
        let policy = fixtures::policy(365, RetentionBasis::Event);
        let row = build_retention(&document, &policy, Utc::now());
        assert_eq!(row.status, RetentionStatus::AwaitingTrigger);
        assert_eq!(row.retention_start_date, None);
        assert_eq!(row.expiration_date, None);
    }

    #[test]
    fn test_record_declaration_falls_back_to_creation() {
        let mut document = fixtures::document();
        document.record_declared_at = None;
        let policy = fixtures::policy(30, RetentionBasis::RecordDeclaration);
        let row = build_retention(&document, &policy, Utc::now());
        assert_eq!(
            row.expiration_date,
            Some(document.created_at + Duration::days(30))
        );
    }
}
