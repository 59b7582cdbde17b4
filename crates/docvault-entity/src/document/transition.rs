//! Lifecycle transition records and the configured rule table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::state::DocumentState;

/// An immutable log entry for one lifecycle transition.
///
/// Written on every transition, whether requested by a user or forced by
/// the system (hold placement/release).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StateTransitionLog {
    /// Unique log entry identifier.
    pub id: Uuid,
    /// The document that transitioned.
    pub document_id: Uuid,
    /// State before the transition.
    pub from_state: DocumentState,
    /// State after the transition.
    pub to_state: DocumentState,
    /// Who performed the transition.
    pub transitioned_by: Uuid,
    /// When the transition happened.
    pub transitioned_at: DateTime<Utc>,
    /// Caller-supplied reason.
    pub reason: Option<String>,
    /// The rule that authorized the transition, if any.
    pub rule_id: Option<Uuid>,
    /// Whether the transition was system-driven rather than manual.
    pub is_system_action: bool,
}

/// One entry of the externally configured transition rule table.
///
/// The table is keyed by `(from_state, to_state)`; a missing entry means
/// the transition is invalid. Loaded once and treated as read-only
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransitionRule {
    /// Unique rule identifier.
    pub id: Uuid,
    /// Source state.
    pub from_state: DocumentState,
    /// Target state.
    pub to_state: DocumentState,
    /// The document must carry a classification.
    pub requires_classification: bool,
    /// The document must carry a retention policy.
    pub requires_retention_policy: bool,
    /// Role required to take this transition; `"System"` marks rules
    /// reachable only through system paths, never manual selection.
    pub required_role: Option<String>,
    /// Whether the transition needs an approval workflow (recorded for
    /// callers; approval itself is external).
    pub requires_approval: bool,
}

impl TransitionRule {
    /// Whether this rule is reserved for system-driven transitions.
    pub fn is_system_only(&self) -> bool {
        self.required_role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("system"))
    }
}
