//! Audit entities.

pub mod model;

pub use model::ActivityLogEntry;
