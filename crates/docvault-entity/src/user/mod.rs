//! User-related enums consumed by the services.

pub mod role;

pub use role::UserRole;
