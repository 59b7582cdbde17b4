//! Repository traits and their PostgreSQL implementations.
//!
//! Each entity has a trait describing the persistence operations the
//! services consume, plus a `Pg*` struct implementing it over sqlx.
//! Services hold the traits as `Arc<dyn …>`, so tests can substitute
//! in-memory implementations.

pub mod activity;
pub mod classification;
pub mod document;
pub mod legal_hold;
pub mod retention;
pub mod transition;
pub mod version;
pub mod working_copy;

pub use activity::PgActivityLog;
pub use classification::{ClassificationRepository, PgClassificationRepository};
pub use document::{DocumentRepository, PgDocumentRepository};
pub use legal_hold::PgLegalHoldQuery;
pub use retention::{
    PgRetentionPolicyRepository, PgRetentionRepository, RetentionPolicyRepository,
    RetentionRepository,
};
pub use transition::{
    PgTransitionLogRepository, PgTransitionRuleRepository, TransitionLogRepository,
    TransitionRuleRepository,
};
pub use version::{PgVersionRepository, VersionRepository};
pub use working_copy::{PgWorkingCopyRepository, WorkingCopyRepository};
