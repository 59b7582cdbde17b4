//! Retention policy entity (read-only configuration for this core).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// What starts the retention clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "retention_basis", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RetentionBasis {
    /// Clock starts at document creation.
    Creation,
    /// Clock starts when the document is declared a record.
    RecordDeclaration,
    /// Clock starts when a configured business event fires.
    Event,
}

impl fmt::Display for RetentionBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Creation => "creation",
            Self::RecordDeclaration => "record_declaration",
            Self::Event => "event",
        };
        write!(f, "{s}")
    }
}

/// A trigger definition attached to an event-based policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionTrigger {
    /// The business event type this trigger matches
    /// (e.g., `"contract.terminated"`).
    pub trigger_type: String,
}

/// A retention policy: how long to keep, from when, and what happens
/// at expiration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RetentionPolicy {
    /// Unique policy identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Days to retain after the start date. `0` means permanent: the
    /// document never becomes disposal-eligible.
    pub retention_days: i64,
    /// What starts the clock.
    pub basis: RetentionBasis,
    /// Action taken at expiration (consumed by the external disposal
    /// process, recorded here only).
    pub expiration_action: String,
    /// Trigger definitions for event-based policies (JSON array).
    pub triggers: Option<sqlx::types::Json<Vec<RetentionTrigger>>>,
}

impl RetentionPolicy {
    /// Whether the policy never expires documents.
    pub fn is_permanent(&self) -> bool {
        self.retention_days == 0
    }

    /// Find a configured trigger matching the given event type.
    pub fn matching_trigger(&self, trigger_type: &str) -> Option<&RetentionTrigger> {
        self.triggers
            .as_ref()?
            .0
            .iter()
            .find(|t| t.trigger_type.eq_ignore_ascii_case(trigger_type))
    }
}
