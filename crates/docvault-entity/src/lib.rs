//! # docvault-entity
//!
//! Domain entity models and enums for DocVault: the document aggregate,
//! its working copy and version chain, lifecycle transition records,
//! retention rows, classifications, and audit entries.

pub mod audit;
pub mod classification;
pub mod document;
pub mod retention;
pub mod user;
