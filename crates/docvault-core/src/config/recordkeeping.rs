//! Recordkeeping configuration — checkout and retention settings.

use serde::{Deserialize, Serialize};

/// Checkout and retention behaviour configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordkeepingConfig {
    /// Hours after which an unreleased checkout is reported as stale.
    #[serde(default = "default_stale_checkout_hours")]
    pub stale_checkout_hours: i64,
    /// Whether published content is mirrored to the write-once target
    /// when a document enters the Record or Archived state.
    #[serde(default)]
    pub mirror_records: bool,
}

impl Default for RecordkeepingConfig {
    fn default() -> Self {
        Self {
            stale_checkout_hours: default_stale_checkout_hours(),
            mirror_records: false,
        }
    }
}

fn default_stale_checkout_hours() -> i64 {
    72
}
