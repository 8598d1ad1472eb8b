//! SQLite store for synced repository metadata.
//!
//! The store keeps four tables:
//! - `repo_data`: raw payload and cache validators per repository
//! - `apt` / `yum`: parsed rows of Debian `Packages` indexes and RPM primary
//!   databases
//! - `package`: normalised package records consumed by the matrix builder

pub mod connection;
pub mod error;
pub mod migration;
pub mod models;
pub mod repository;
pub mod schema;

pub use connection::DbConnection;
pub use error::{DbError, Result};
