//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. UUIDs and calendar dates are stored as
//! strings; enums are strings guarded by ASSERT constraints.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "account_tables",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "session_storage_and_options",
        sql: SCHEMA_V2,
    },
    Migration {
        version: 3,
        name: "tenant_rent_payments",
        sql: SCHEMA_V3,
    },
];

// -----------------------------------------------------------------------
// v1: admin and tenant accounts
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Admin accounts (admin + superadmin)
-- =======================================================================
DEFINE TABLE admin SCHEMAFULL;
DEFINE FIELD username ON TABLE admin TYPE string;
DEFINE FIELD full_name ON TABLE admin TYPE string;
DEFINE FIELD password_hash ON TABLE admin TYPE string;
DEFINE FIELD role ON TABLE admin TYPE string \
    ASSERT $value IN ['admin', 'superadmin'];
DEFINE FIELD permissions ON TABLE admin TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD active ON TABLE admin TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE admin TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE admin TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_admin_username ON TABLE admin \
    COLUMNS username UNIQUE;

-- =======================================================================
-- Tenant accounts with lease fields
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD login_id ON TABLE tenant TYPE string;
DEFINE FIELD full_name ON TABLE tenant TYPE string;
DEFINE FIELD unit ON TABLE tenant TYPE string;
DEFINE FIELD password_hash ON TABLE tenant TYPE string;
DEFINE FIELD registration_date ON TABLE tenant TYPE string;
DEFINE FIELD first_payment_date ON TABLE tenant TYPE option<string>;
DEFINE FIELD monthly_rent_cents ON TABLE tenant TYPE int \
    ASSERT $value >= 0;
DEFINE FIELD active ON TABLE tenant TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_login_id ON TABLE tenant \
    COLUMNS login_id UNIQUE;
";

// -----------------------------------------------------------------------
// v2: persisted sessions and dropdown options
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
-- Record id is the storage key.
DEFINE TABLE session_entry SCHEMAFULL;
DEFINE FIELD payload ON TABLE session_entry TYPE string;
DEFINE FIELD updated_at ON TABLE session_entry TYPE datetime \
    DEFAULT time::now();

-- Record id is the option category.
DEFINE TABLE option_list SCHEMAFULL;
DEFINE FIELD items ON TABLE option_list TYPE array<string>;
DEFINE FIELD updated_at ON TABLE option_list TYPE datetime \
    DEFAULT time::now();
";

// -----------------------------------------------------------------------
// v3: recorded rent cycles
// -----------------------------------------------------------------------

const SCHEMA_V3: &str = "\
DEFINE FIELD cycles_paid ON TABLE tenant TYPE int DEFAULT 0 \
    ASSERT $value >= 0;
-- A recorded first payment covers the first cycle.
UPDATE tenant SET cycles_paid = 1 \
    WHERE cycles_paid = NONE AND first_payment_date != NONE;
UPDATE tenant SET cycles_paid = 0 WHERE cycles_paid = NONE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates the `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the recorded maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "failed to record v{}: {}",
                    migration.version, e,
                ))
            })?;
    }

    info!(
        version = MIGRATIONS.last().map(|m| m.version).unwrap_or(0),
        "Schema up to date"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn every_migration_has_ddl() {
        for migration in MIGRATIONS {
            assert!(migration.sql.contains("DEFINE "), "{}", migration.name);
        }
    }
}
