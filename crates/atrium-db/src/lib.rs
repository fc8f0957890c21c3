//! Atrium Database: SurrealDB connection management, schema
//! migrations, and repository implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Repository implementations for the `atrium-core` traits
//! - Error types ([`DbError`])

mod connection;
mod error;
mod password;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager, MEMORY_URL};
pub use error::DbError;
pub use schema::run_migrations;
