//! Lifecycle state machine: rule-table transitions, the legal-hold
//! protocol, and allowed-transition queries.

pub mod service;

pub use service::LifecycleService;
