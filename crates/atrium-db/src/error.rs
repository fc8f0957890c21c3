//! Database-specific error types and conversions.

use atrium_core::error::AtriumError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    Duplicate { entity: String },

    #[error("Stored record is invalid: {0}")]
    InvalidRecord(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl DbError {
    /// Classify a failed statement, recognising unique-index violations.
    pub(crate) fn from_check(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") || message.contains("already exists") {
            DbError::Duplicate {
                entity: entity.to_string(),
            }
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for AtriumError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AtriumError::NotFound { entity, id },
            DbError::Duplicate { entity } => AtriumError::AlreadyExists { entity },
            DbError::Hashing(msg) => AtriumError::Crypto(msg),
            other => AtriumError::Database(other.to_string()),
        }
    }
}
