//! # docvault-service
//!
//! Business logic services for DocVault. This crate is the versioning and
//! lifecycle engine: the checkout/working-copy protocol, the append-only
//! version chain, the rule-driven lifecycle state machine, and the
//! retention scheduler. Repositories and collaborators are consumed as
//! trait objects so every service is unit-testable in memory.

pub mod checkout;
pub mod context;
pub mod lifecycle;
pub mod retention;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
