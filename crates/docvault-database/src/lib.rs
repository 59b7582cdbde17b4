//! # docvault-database
//!
//! PostgreSQL connection management, migrations, repository traits, and
//! their concrete sqlx implementations for all DocVault entities.

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
