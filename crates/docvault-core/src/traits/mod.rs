//! Collaborator traits consumed by the versioning and lifecycle services.
//!
//! The traits here are the seams to external concerns: physical blob
//! storage, upload validation, audit logging, and legal-hold case
//! management. Implementations live in `docvault-storage` and
//! `docvault-database`.

pub mod activity;
pub mod legal_hold;
pub mod storage;
pub mod validator;

pub use activity::{ActivityLog, ActivityRecord};
pub use legal_hold::LegalHoldQuery;
pub use storage::{StorageProvider, StoredObject};
pub use validator::{FileValidation, FileValidator};
