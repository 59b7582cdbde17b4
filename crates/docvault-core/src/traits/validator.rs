//! File validation trait for uploaded content.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// The outcome of validating an uploaded file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FileValidation {
    /// Whether the file is acceptable.
    pub valid: bool,
    /// The content type the validator resolved (may differ from the
    /// claimed one).
    pub resolved_content_type: Option<String>,
    /// Rejection reason when `valid` is false.
    pub error: Option<String>,
    /// Non-fatal advisory (e.g., claimed type disagrees with extension).
    pub warning: Option<String>,
}

impl FileValidation {
    /// A passing validation with the given resolved content type.
    pub fn ok(resolved_content_type: impl Into<String>) -> Self {
        Self {
            valid: true,
            resolved_content_type: Some(resolved_content_type.into()),
            error: None,
            warning: None,
        }
    }

    /// A failing validation with the given reason.
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            resolved_content_type: None,
            error: Some(error.into()),
            warning: None,
        }
    }
}

/// Trait for validating uploaded file content before it is staged.
#[async_trait]
pub trait FileValidator: Send + Sync + std::fmt::Debug + 'static {
    /// Validate the file bytes against the claimed name and content type.
    async fn validate(
        &self,
        data: &Bytes,
        file_name: &str,
        claimed_content_type: Option<&str>,
    ) -> AppResult<FileValidation>;
}
