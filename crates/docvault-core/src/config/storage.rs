//! Storage provider configuration.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root path for published and draft document content.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Optional root path of the write-once mirror target. When set,
    /// published content is mirrored here on declaration as a record or
    /// on archival.
    #[serde(default)]
    pub write_once_root: Option<String>,
    /// Maximum upload size in bytes (default 2 GB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// File extensions rejected by the file validator.
    #[serde(default = "default_blocked_extensions")]
    pub blocked_extensions: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            write_once_root: None,
            max_upload_size_bytes: default_max_upload(),
            blocked_extensions: default_blocked_extensions(),
        }
    }
}

fn default_root_path() -> String {
    "./data/storage".to_string()
}

fn default_max_upload() -> u64 {
    2_147_483_648 // 2 GB
}

fn default_blocked_extensions() -> Vec<String> {
    ["exe", "dll", "bat", "cmd", "sh", "msi"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
