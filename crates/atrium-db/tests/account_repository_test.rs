//! Integration tests for the admin and tenant repositories using
//! in-memory SurrealDB.

use atrium_core::error::AtriumError;
use atrium_core::models::admin::{CreateAdmin, UpdateAdmin};
use atrium_core::models::principal::{PermissionSet, Role};
use atrium_core::models::tenant::{CreateTenant, LeaseRecord, UpdateTenant};
use atrium_core::repository::{AdminRepository, Pagination, TenantRepository};
use atrium_db::repository::{SurrealAdminRepository, SurrealTenantRepository};
use chrono::NaiveDate;
use atrium_db::{DbConfig, DbManager};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

async fn setup() -> Surreal<Any> {
    DbManager::open(&DbConfig::in_memory())
        .await
        .unwrap()
        .into_client()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_admin(username: &str, permissions: Option<PermissionSet>) -> CreateAdmin {
    CreateAdmin {
        username: username.into(),
        full_name: format!("{username} (staff)"),
        password: "front-desk-secret".into(),
        role: Role::Admin,
        permissions,
    }
}

fn new_tenant(login_id: &str, first_payment: Option<NaiveDate>) -> CreateTenant {
    CreateTenant {
        login_id: login_id.into(),
        full_name: "Harbor Coffee Ltd".into(),
        unit: "G-02".into(),
        password: "espresso-every-day".into(),
        lease: LeaseRecord {
            registration_date: date(2024, 2, 1),
            first_payment_date: first_payment,
            monthly_rent_cents: 310_000,
            cycles_paid: u32::from(first_payment.is_some()),
        },
    }
}

// -----------------------------------------------------------------------
// Admins
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_admin() {
    let repo = SurrealAdminRepository::new(setup().await);
    let permissions = PermissionSet::new(["tenants", "vendors"], ["dashboard"]);

    let admin = repo
        .create(new_admin("maria", Some(permissions.clone())))
        .await
        .unwrap();

    assert_eq!(admin.username, "maria");
    assert_eq!(admin.role, Role::Admin);
    assert!(admin.active);
    assert_eq!(admin.permissions, Some(permissions));
    assert!(admin.password_hash.starts_with("$argon2id$"));
    assert_ne!(admin.password_hash, "front-desk-secret");

    let fetched = repo.get_by_id(admin.id).await.unwrap();
    assert_eq!(fetched.id, admin.id);
    assert_eq!(fetched.permissions, admin.permissions);
}

#[tokio::test]
async fn absent_permissions_round_trip_as_none() {
    let repo = SurrealAdminRepository::new(setup().await);
    let admin = repo.create(new_admin("nopes", None)).await.unwrap();
    assert_eq!(admin.permissions, None);

    let fetched = repo.get_active_by_username("nopes").await.unwrap();
    assert_eq!(fetched.permissions, None);
}

#[tokio::test]
async fn duplicate_username_rejected() {
    let repo = SurrealAdminRepository::new(setup().await);
    repo.create(new_admin("maria", None)).await.unwrap();

    let err = repo.create(new_admin("maria", None)).await.unwrap_err();
    assert!(matches!(err, AtriumError::AlreadyExists { .. }), "{err:?}");
}

#[tokio::test]
async fn inactive_admin_hidden_from_login_lookup() {
    let repo = SurrealAdminRepository::new(setup().await);
    let admin = repo.create(new_admin("leaving", None)).await.unwrap();

    repo.update(
        admin.id,
        UpdateAdmin {
            active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = repo.get_active_by_username("leaving").await.unwrap_err();
    assert!(matches!(err, AtriumError::NotFound { .. }));
    // Still reachable by ID for administration.
    assert!(!repo.get_by_id(admin.id).await.unwrap().active);
}

#[tokio::test]
async fn update_replaces_and_clears_permissions() {
    let repo = SurrealAdminRepository::new(setup().await);
    let admin = repo.create(new_admin("maria", None)).await.unwrap();

    let set = PermissionSet::new(["payments"], ["payments"]);
    let updated = repo
        .update(
            admin.id,
            UpdateAdmin {
                permissions: Some(Some(set.clone())),
                full_name: Some("Maria Lopez".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.permissions, Some(set));
    assert_eq!(updated.full_name, "Maria Lopez");

    let cleared = repo
        .update(
            admin.id,
            UpdateAdmin {
                permissions: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.permissions, None);
}

#[tokio::test]
async fn set_password_rehashes() {
    let repo = SurrealAdminRepository::new(setup().await);
    let admin = repo.create(new_admin("maria", None)).await.unwrap();

    repo.set_password(admin.id, "brand-new-secret").await.unwrap();
    let fetched = repo.get_by_id(admin.id).await.unwrap();
    assert_ne!(fetched.password_hash, admin.password_hash);
    assert!(fetched.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn set_password_on_missing_admin_is_not_found() {
    let repo = SurrealAdminRepository::new(setup().await);
    let err = repo
        .set_password(uuid::Uuid::new_v4(), "whatever-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AtriumError::NotFound { .. }));
}

#[tokio::test]
async fn list_admins_paginates() {
    let repo = SurrealAdminRepository::new(setup().await);
    for name in ["carol", "alice", "bob"] {
        repo.create(new_admin(name, None)).await.unwrap();
    }

    let page = repo
        .list(Pagination {
            offset: 0,
            limit: 2,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].username, "alice");
    assert_eq!(page.items[1].username, "bob");
}

// -----------------------------------------------------------------------
// Tenants
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_lookup_tenant() {
    let repo = SurrealTenantRepository::new(setup().await);
    let tenant = repo
        .create(new_tenant("harbor-coffee", Some(date(2024, 2, 10))))
        .await
        .unwrap();

    assert_eq!(tenant.lease.registration_date, date(2024, 2, 1));
    assert_eq!(tenant.lease.first_payment_date, Some(date(2024, 2, 10)));
    assert_eq!(tenant.lease.monthly_rent_cents, 310_000);
    assert!(tenant.password_hash.starts_with("$argon2id$"));

    let fetched = repo.get_active_by_login_id("harbor-coffee").await.unwrap();
    assert_eq!(fetched.id, tenant.id);
    assert_eq!(fetched.lease, tenant.lease);
}

#[tokio::test]
async fn tenant_without_first_payment() {
    let repo = SurrealTenantRepository::new(setup().await);
    let tenant = repo.create(new_tenant("new-lease", None)).await.unwrap();
    assert_eq!(tenant.lease.first_payment_date, None);

    let fetched = repo.get_by_id(tenant.id).await.unwrap();
    assert_eq!(fetched.lease.first_payment_date, None);
}

#[tokio::test]
async fn update_tenant_lease_fields() {
    let repo = SurrealTenantRepository::new(setup().await);
    let tenant = repo.create(new_tenant("harbor-coffee", None)).await.unwrap();

    let updated = repo
        .update(
            tenant.id,
            UpdateTenant {
                first_payment_date: Some(Some(date(2024, 3, 1))),
                monthly_rent_cents: Some(325_000),
                cycles_paid: Some(4),
                unit: Some("G-03".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.lease.first_payment_date, Some(date(2024, 3, 1)));
    assert_eq!(updated.lease.monthly_rent_cents, 325_000);
    assert_eq!(updated.lease.cycles_paid, 4);
    assert_eq!(
        repo.get_by_id(updated.id).await.unwrap().lease.cycles_paid,
        4
    );
    assert_eq!(updated.unit, "G-03");

    let cleared = repo
        .update(
            tenant.id,
            UpdateTenant {
                first_payment_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.lease.first_payment_date, None);
}

#[tokio::test]
async fn deactivated_tenant_cannot_be_found_for_login() {
    let repo = SurrealTenantRepository::new(setup().await);
    let tenant = repo.create(new_tenant("moving-out", None)).await.unwrap();
    repo.update(
        tenant.id,
        UpdateTenant {
            active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(matches!(
        repo.get_active_by_login_id("moving-out").await,
        Err(AtriumError::NotFound { .. })
    ));
}

#[tokio::test]
async fn list_tenants_counts_all() {
    let repo = SurrealTenantRepository::new(setup().await);
    repo.create(new_tenant("a-tenant", None)).await.unwrap();
    repo.create(new_tenant("b-tenant", None)).await.unwrap();

    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);
}
