//! Storage provider trait for pluggable blob storage backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// The outcome of persisting a blob: where it landed and what it hashed to.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoredObject {
    /// Path within the storage provider.
    pub path: String,
    /// Hex-encoded content hash.
    pub content_hash: String,
    /// Hash algorithm name (e.g., `"SHA-256"`).
    pub hash_algorithm: String,
    /// Size in bytes.
    pub size_bytes: i64,
}

/// Trait for blob storage backends.
///
/// The published blob of every document version and the draft blob of a
/// working copy are stored under distinct keys through this trait. The
/// trait is defined here in `docvault-core` and implemented in
/// `docvault-storage`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Persist a blob under the given logical key and return its
    /// stored path, content hash, and size.
    async fn save(&self, data: Bytes, key: &str) -> AppResult<StoredObject>;

    /// Read a blob into memory as a complete byte vector.
    async fn get(&self, path: &str) -> AppResult<Bytes>;

    /// Delete a blob at the given path. Returns `true` if it existed.
    async fn delete(&self, path: &str) -> AppResult<bool>;

    /// Check whether a blob exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;
}
