//! Default file validator.

use async_trait::async_trait;
use bytes::Bytes;

use docvault_core::config::storage::StorageConfig;
use docvault_core::result::AppResult;
use docvault_core::traits::validator::{FileValidation, FileValidator};

/// Validates uploads against the storage configuration: size cap,
/// blocked extensions, and claimed-type sanity.
#[derive(Debug, Clone)]
pub struct DefaultFileValidator {
    max_size_bytes: u64,
    blocked_extensions: Vec<String>,
}

impl DefaultFileValidator {
    /// Build a validator from storage configuration.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            max_size_bytes: config.max_upload_size_bytes,
            blocked_extensions: config
                .blocked_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    fn extension(file_name: &str) -> Option<String> {
        file_name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != file_name)
            .map(|ext| ext.to_lowercase())
    }

    fn guess_content_type(extension: Option<&str>) -> &'static str {
        match extension {
            Some("pdf") => "application/pdf",
            Some("txt") => "text/plain",
            Some("csv") => "text/csv",
            Some("json") => "application/json",
            Some("xml") => "application/xml",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("doc") => "application/msword",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("xls") => "application/vnd.ms-excel",
            Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            _ => "application/octet-stream",
        }
    }
}

#[async_trait]
impl FileValidator for DefaultFileValidator {
    async fn validate(
        &self,
        data: &Bytes,
        file_name: &str,
        claimed_content_type: Option<&str>,
    ) -> AppResult<FileValidation> {
        if data.is_empty() {
            return Ok(FileValidation::rejected("File content is empty"));
        }

        if data.len() as u64 > self.max_size_bytes {
            return Ok(FileValidation::rejected(format!(
                "File exceeds maximum upload size of {} bytes",
                self.max_size_bytes
            )));
        }

        let extension = Self::extension(file_name);
        if let Some(ext) = &extension {
            if self.blocked_extensions.iter().any(|b| b == ext) {
                return Ok(FileValidation::rejected(format!(
                    "File extension '.{ext}' is not allowed"
                )));
            }
        }

        let resolved = Self::guess_content_type(extension.as_deref());
        let mut validation = FileValidation::ok(resolved);
        if let Some(claimed) = claimed_content_type {
            if !claimed.eq_ignore_ascii_case(resolved) && resolved != "application/octet-stream" {
                validation.warning = Some(format!(
                    "Claimed content type '{claimed}' does not match extension ('{resolved}')"
                ));
            }
        }
        Ok(validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> DefaultFileValidator {
        DefaultFileValidator::new(&StorageConfig::default())
    }

    #[tokio::test]
    async fn test_rejects_blocked_extension() {
        let v = validator();
        let result = v
            .validate(&Bytes::from("MZ"), "evil.exe", None)
            .await
            .unwrap();
        assert!(!result.valid);
        assert!(result.error.unwrap().contains(".exe"));
    }

    #[tokio::test]
    async fn test_rejects_empty() {
        let v = validator();
        let result = v.validate(&Bytes::new(), "empty.txt", None).await.unwrap();
        assert!(!result.valid);
    }

    #[tokio::test]
    async fn test_resolves_content_type_and_warns_on_mismatch() {
        let v = validator();
        let result = v
            .validate(&Bytes::from("%PDF"), "report.pdf", Some("text/plain"))
            .await
            .unwrap();
        assert!(result.valid);
        assert_eq!(result.resolved_content_type.as_deref(), Some("application/pdf"));
        assert!(result.warning.is_some());
    }
}
