//! Retention scheduling entities: the per-document retention row,
//! policies, and trigger audit records.

pub mod model;
pub mod policy;
pub mod trigger;

pub use model::{DocumentRetention, RetentionStatus};
pub use policy::{RetentionBasis, RetentionPolicy, RetentionTrigger};
pub use trigger::RetentionTriggerLog;
