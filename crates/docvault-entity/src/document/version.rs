//! Document version entity — the append-only version chain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// How a check-in advances the human-facing version label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "version_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VersionType {
    /// Increments major, resets minor to 0.
    Major,
    /// Increments minor, keeps major.
    Minor,
    /// Keeps the label; content/metadata change without advancing it.
    Overwrite,
}

impl fmt::Display for VersionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Overwrite => write!(f, "overwrite"),
        }
    }
}

/// One link in a document's version chain.
///
/// Version rows are immutable once created, except for
/// `integrity_verified_at`, which records the most recent successful
/// content hash verification. Rows are never deleted by this core.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// The document this version belongs to.
    pub document_id: Uuid,
    /// Dense sequential version number, starting at 1 with no gaps.
    pub version_number: i32,
    /// Human-facing major version.
    pub major_version: i32,
    /// Human-facing minor version.
    pub minor_version: i32,
    /// The "major.minor" label.
    pub version_label: String,
    /// How this version advanced the label.
    pub version_type: VersionType,
    /// Path of this version's content blob.
    pub storage_path: Option<String>,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// Hex-encoded content hash.
    pub content_hash: Option<String>,
    /// Hash algorithm name.
    pub hash_algorithm: Option<String>,
    /// MIME type of the content.
    pub content_type: Option<String>,
    /// Whether this version changed content relative to its predecessor.
    pub is_content_changed: bool,
    /// Whether this version changed metadata relative to its predecessor.
    pub is_metadata_changed: bool,
    /// Back-link forming the chain; `None` only for version 1.
    pub previous_version_id: Option<Uuid>,
    /// What changed, as described by the author.
    pub change_description: Option<String>,
    /// Free-form check-in comment.
    pub comment: Option<String>,
    /// Who created this version.
    pub created_by: Uuid,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
    /// When this version's content hash was last verified.
    pub integrity_verified_at: Option<DateTime<Utc>>,
}
