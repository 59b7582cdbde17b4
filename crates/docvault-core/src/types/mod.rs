//! Shared value types.

pub mod patch;

pub use patch::Patch;
