//! SurrealDB repository implementations.

mod admin;
mod option_list;
mod session_store;
mod tenant;

use surrealdb_types::SurrealValue;

pub use admin::SurrealAdminRepository;
pub use option_list::SurrealOptionRepository;
pub use session_store::SurrealSessionStore;
pub use tenant::SurrealTenantRepository;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}
