//! Version chain services: minting, snapshots, comparison, restore,
//! and integrity verification.

pub mod compare;
pub mod service;

pub use compare::{FieldChange, FieldComparison, VersionComparison};
pub use service::{RestoreRequest, VersionService, VersionSpec};
