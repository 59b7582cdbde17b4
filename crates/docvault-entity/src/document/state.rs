//! Document lifecycle state enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle states a document moves through.
///
/// Which transitions are legal between states is configuration
/// (see [`super::TransitionRule`]), not encoded here; this enum only
/// owns the immutability predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentState {
    /// Normal working document; editable.
    Active,
    /// Declared an official record; immutable.
    Record,
    /// Moved to the archive tier; immutable.
    Archived,
    /// Under legal hold; immutable. Entered only via the hold path.
    OnHold,
    /// Retention expired, awaiting disposal review; immutable.
    PendingDisposal,
    /// Flagged for investigation; immutable.
    Quarantined,
    /// Disposed. Terminal; the content erasure itself is external.
    Disposed,
}

impl DocumentState {
    /// Whether documents in this state refuse content/metadata edits.
    ///
    /// This predicate is the single source of truth for the immutable
    /// set; callers gate checkout on it.
    pub fn is_immutable(&self) -> bool {
        matches!(
            self,
            Self::Record
                | Self::Archived
                | Self::OnHold
                | Self::PendingDisposal
                | Self::Quarantined
        )
    }

    /// Whether this state is terminal (no transitions leave it).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Disposed)
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Record => "record",
            Self::Archived => "archived",
            Self::OnHold => "on_hold",
            Self::PendingDisposal => "pending_disposal",
            Self::Quarantined => "quarantined",
            Self::Disposed => "disposed",
        }
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DocumentState {
    type Err = docvault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "record" => Ok(Self::Record),
            "archived" => Ok(Self::Archived),
            "on_hold" => Ok(Self::OnHold),
            "pending_disposal" => Ok(Self::PendingDisposal),
            "quarantined" => Ok(Self::Quarantined),
            "disposed" => Ok(Self::Disposed),
            _ => Err(docvault_core::AppError::validation(format!(
                "Invalid document state: '{s}'"
            ))),
        }
    }
}
