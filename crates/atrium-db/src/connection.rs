//! Opening the Atrium database.
//!
//! The URL scheme picks the engine: `ws://host:port` reaches a
//! SurrealDB server and signs in as root, `mem://` opens a throwaway
//! in-process store (tests, local demos) where no sign-in exists.

use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

/// URL of the in-process engine.
pub const MEMORY_URL: &str = "mem://";

/// Where the building database lives.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Engine URL, e.g. `ws://127.0.0.1:8000` or `mem://`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials; ignored by the in-process engine.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000".into(),
            namespace: "atrium".into(),
            database: "building".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Fresh in-process database. Each call yields an empty store.
    pub fn in_memory() -> Self {
        Self {
            url: MEMORY_URL.into(),
            ..Self::default()
        }
    }

    fn is_embedded(&self) -> bool {
        self.url.starts_with("mem:") || self.url == "memory"
    }
}

/// An open, namespace-selected handle to the building database.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Any>,
}

impl DbManager {
    /// Open the engine named by `config.url` and select the namespace
    /// and database. Does not touch the schema.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let embedded = config.is_embedded();
        info!(
            url = %config.url,
            embedded,
            namespace = %config.namespace,
            database = %config.database,
            "Opening building database"
        );

        let db = any::connect(config.url.as_str()).await?;
        if !embedded {
            db.signin(Root {
                username: config.username.clone(),
                password: config.password.clone(),
            })
            .await?;
        }
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        Ok(Self { db })
    }

    /// [`connect`](Self::connect), then bring the schema up to date.
    pub async fn open(config: &DbConfig) -> Result<Self, DbError> {
        let manager = Self::connect(config).await?;
        run_migrations(&manager.db).await?;
        Ok(manager)
    }

    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }

    pub fn into_client(self) -> Surreal<Any> {
        self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_follows_url_scheme() {
        assert!(DbConfig::in_memory().is_embedded());
        assert!(!DbConfig::default().is_embedded());
        let remote = DbConfig {
            url: "ws://db.internal:8000".into(),
            ..DbConfig::default()
        };
        assert!(!remote.is_embedded());
    }
}
