//! Legal-hold query trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// Query into the externally managed legal-hold system.
///
/// Hold case management is out of scope; this core only ever asks whether
/// a given document is currently under hold.
#[async_trait]
pub trait LegalHoldQuery: Send + Sync + std::fmt::Debug + 'static {
    /// Returns whether the document is currently on legal hold.
    async fn is_on_hold(&self, document_id: Uuid) -> AppResult<bool>;
}
