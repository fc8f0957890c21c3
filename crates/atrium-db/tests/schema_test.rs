//! Integration tests for schema initialization using in-memory SurrealDB.

use atrium_db::{DbConfig, DbManager};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

async fn fresh_db() -> Surreal<Any> {
    DbManager::connect(&DbConfig::in_memory())
        .await
        .unwrap()
        .into_client()
}

#[tokio::test]
async fn migrations_define_all_tables() {
    let db = fresh_db().await;
    atrium_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info_str = format!("{:?}", info.expect("INFO FOR DB should return a value"));

    for table in ["admin", "tenant", "session_entry", "option_list", "_migration"] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = fresh_db().await;
    atrium_db::run_migrations(&db).await.unwrap();
    atrium_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 3, "expected one record per migration");
}

#[tokio::test]
async fn negative_rent_is_rejected() {
    let db = fresh_db().await;
    atrium_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE tenant SET login_id = 'neg', full_name = 'Neg', \
             unit = '1-A', password_hash = 'x', \
             registration_date = '2024-01-01', monthly_rent_cents = -5",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "negative rent should be rejected");
}

#[tokio::test]
async fn admin_role_is_constrained() {
    let db = fresh_db().await;
    atrium_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE admin SET username = 'x', full_name = 'X', \
             password_hash = 'x', role = 'tenant'",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "tenant role must not be stored on admin");
}

#[tokio::test]
async fn recorded_cycles_cannot_go_negative() {
    let db = fresh_db().await;
    atrium_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE tenant SET login_id = 'cyc', full_name = 'Cyc', \
             unit = '1-B', password_hash = 'x', \
             registration_date = '2024-01-01', monthly_rent_cents = 100, \
             cycles_paid = -1",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "negative cycle count should be rejected");
}
