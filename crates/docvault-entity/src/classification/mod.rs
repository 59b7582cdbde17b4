//! Classification scheme entities.

pub mod model;

pub use model::Classification;
