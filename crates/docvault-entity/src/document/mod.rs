//! The document aggregate: model, lifecycle state, working copy,
//! version chain, metadata snapshots, and transition records.

pub mod model;
pub mod state;
pub mod transition;
pub mod version;
pub mod version_metadata;
pub mod working_copy;

pub use model::Document;
pub use state::DocumentState;
pub use transition::{StateTransitionLog, TransitionRule};
pub use version::{DocumentVersion, VersionType};
pub use version_metadata::VersionMetadataField;
pub use working_copy::DocumentWorkingCopy;
