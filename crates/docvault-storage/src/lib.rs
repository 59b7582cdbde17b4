//! # docvault-storage
//!
//! Blob storage providers and upload validation for DocVault. The
//! [`StorageProvider`](docvault_core::traits::StorageProvider) trait is
//! defined in `docvault-core`; this crate implements it for the local
//! filesystem and provides the storage key scheme that keeps draft and
//! published content in distinct slots.

pub mod keys;
pub mod local;
pub mod validator;

pub use local::LocalStorageProvider;
pub use validator::DefaultFileValidator;
