//! SurrealDB implementation of [`SessionStore`].
//!
//! Each storage key is a `session_entry` record ID, so writes are
//! upserts and reads are direct record lookups.

use atrium_core::error::AtriumResult;
use atrium_core::repository::SessionStore;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PayloadRow {
    payload: String,
}

#[derive(Clone)]
pub struct SurrealSessionStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionStore for SurrealSessionStore<C> {
    async fn read(&self, key: &str) -> AtriumResult<Option<String>> {
        let mut result = self
            .db
            .query("SELECT payload FROM type::record('session_entry', $key)")
            .bind(("key", key.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PayloadRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(|row| row.payload))
    }

    async fn write(&self, key: &str, value: String) -> AtriumResult<()> {
        self.db
            .query(
                "UPSERT type::record('session_entry', $key) SET \
                 payload = $payload, updated_at = time::now()",
            )
            .bind(("key", key.to_string()))
            .bind(("payload", value))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn clear(&self, key: &str) -> AtriumResult<()> {
        self.db
            .query("DELETE type::record('session_entry', $key)")
            .bind(("key", key.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}
