//! SurrealDB implementation of [`TenantRepository`].
//!
//! Lease dates are stored as `YYYY-MM-DD` strings.

use atrium_core::error::AtriumResult;
use atrium_core::models::tenant::{CreateTenant, LeaseRecord, TenantAccount, UpdateTenant};
use atrium_core::repository::{PaginatedResult, Pagination, TenantRepository};
use chrono::{DateTime, NaiveDate, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;
use crate::password::hash_password;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, SurrealValue)]
struct TenantRow {
    login_id: String,
    full_name: String,
    unit: String,
    password_hash: String,
    registration_date: String,
    first_payment_date: Option<String>,
    monthly_rent_cents: u64,
    cycles_paid: u32,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    login_id: String,
    full_name: String,
    unit: String,
    password_hash: String,
    registration_date: String,
    first_payment_date: Option<String>,
    monthly_rent_cents: u64,
    cycles_paid: u32,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(s: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| DbError::InvalidRecord(format!("invalid date {s:?}: {e}")))
}

impl TenantRow {
    fn into_tenant(self, id: Uuid) -> Result<TenantAccount, DbError> {
        let first_payment_date = self
            .first_payment_date
            .as_deref()
            .map(parse_date)
            .transpose()?;
        Ok(TenantAccount {
            id,
            login_id: self.login_id,
            full_name: self.full_name,
            unit: self.unit,
            password_hash: self.password_hash,
            lease: LeaseRecord {
                registration_date: parse_date(&self.registration_date)?,
                first_payment_date,
                monthly_rent_cents: self.monthly_rent_cents,
                cycles_paid: self.cycles_paid,
            },
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TenantRowWithId {
    fn try_into_tenant(self) -> Result<TenantAccount, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::InvalidRecord(format!("invalid UUID: {e}")))?;
        TenantRow {
            login_id: self.login_id,
            full_name: self.full_name,
            unit: self.unit,
            password_hash: self.password_hash,
            registration_date: self.registration_date,
            first_payment_date: self.first_payment_date,
            monthly_rent_cents: self.monthly_rent_cents,
            cycles_paid: self.cycles_paid,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_tenant(id)
    }
}

/// SurrealDB implementation of the tenant account repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> AtriumResult<TenantAccount> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('tenant', $id) SET \
                 login_id = $login_id, full_name = $full_name, \
                 unit = $unit, password_hash = $password_hash, \
                 registration_date = $registration_date, \
                 first_payment_date = $first_payment_date, \
                 monthly_rent_cents = $monthly_rent_cents, \
                 cycles_paid = $cycles_paid, active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("login_id", input.login_id))
            .bind(("full_name", input.full_name))
            .bind(("unit", input.unit))
            .bind(("password_hash", password_hash))
            .bind((
                "registration_date",
                format_date(input.lease.registration_date),
            ))
            .bind((
                "first_payment_date",
                input.lease.first_payment_date.map(format_date),
            ))
            .bind(("monthly_rent_cents", input.lease.monthly_rent_cents))
            .bind(("cycles_paid", input.lease.cycles_paid))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("tenant", e))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> AtriumResult<TenantAccount> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn get_active_by_login_id(&self, login_id: &str) -> AtriumResult<TenantAccount> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 WHERE login_id = $login_id AND active = true",
            )
            .bind(("login_id", login_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: format!("login_id={login_id}"),
        })?;

        Ok(row.try_into_tenant()?)
    }

    async fn update(&self, id: Uuid, input: UpdateTenant) -> AtriumResult<TenantAccount> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.full_name.is_some() {
            sets.push("full_name = $full_name");
        }
        if input.unit.is_some() {
            sets.push("unit = $unit");
        }
        if input.registration_date.is_some() {
            sets.push("registration_date = $registration_date");
        }
        if input.first_payment_date.is_some() {
            sets.push("first_payment_date = $first_payment_date");
        }
        if input.monthly_rent_cents.is_some() {
            sets.push("monthly_rent_cents = $monthly_rent_cents");
        }
        if input.cycles_paid.is_some() {
            sets.push("cycles_paid = $cycles_paid");
        }
        if input.active.is_some() {
            sets.push("active = $active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('tenant', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(full_name) = input.full_name {
            builder = builder.bind(("full_name", full_name));
        }
        if let Some(unit) = input.unit {
            builder = builder.bind(("unit", unit));
        }
        if let Some(date) = input.registration_date {
            builder = builder.bind(("registration_date", format_date(date)));
        }
        if let Some(first_payment_date) = input.first_payment_date {
            // Some(None) clears the date.
            builder = builder.bind(("first_payment_date", first_payment_date.map(format_date)));
        }
        if let Some(cents) = input.monthly_rent_cents {
            builder = builder.bind(("monthly_rent_cents", cents));
        }
        if let Some(cycles) = input.cycles_paid {
            builder = builder.bind(("cycles_paid", cycles));
        }
        if let Some(active) = input.active {
            builder = builder.bind(("active", active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("tenant", e))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn set_password(&self, id: Uuid, password: &str) -> AtriumResult<()> {
        let id_str = id.to_string();
        let password_hash = hash_password(password, self.pepper.as_deref())?;

        let mut result = self
            .db
            .query(
                "UPDATE type::record('tenant', $id) SET \
                 password_hash = $password_hash, updated_at = time::now() \
                 RETURN AFTER",
            )
            .bind(("id", id_str.clone()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "tenant".into(),
                id: id_str,
            }
            .into());
        }
        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> AtriumResult<PaginatedResult<TenantAccount>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM tenant GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 ORDER BY unit ASC, login_id ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(TenantRowWithId::try_into_tenant)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
