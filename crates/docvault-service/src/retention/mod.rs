//! Retention engine: policy application, trigger events, classification
//! defaults, and legal-hold suspension math.

pub mod service;

pub use service::RetentionService;
