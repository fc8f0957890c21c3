//! Atrium Core: domain models, repository traits, and the pure logic
//! shared by every other crate: the authorization model, the lease
//! cycle calculator, and the shared option catalog.

pub mod authz;
pub mod error;
pub mod lease;
pub mod models;
pub mod options;
pub mod repository;

pub use error::{AtriumError, AtriumResult};
