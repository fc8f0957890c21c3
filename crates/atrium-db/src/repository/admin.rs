//! SurrealDB implementation of [`AdminRepository`].

use atrium_core::error::AtriumResult;
use atrium_core::models::admin::{AdminAccount, CreateAdmin, UpdateAdmin};
use atrium_core::models::principal::{PermissionSet, Role};
use atrium_core::repository::{AdminRepository, PaginatedResult, Pagination};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;
use crate::password::hash_password;

/// Row returned by `CREATE`/`UPDATE`, where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AdminRow {
    username: String,
    full_name: String,
    password_hash: String,
    role: String,
    permissions: serde_json::Value,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row that carries the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AdminRowWithId {
    record_id: String,
    username: String,
    full_name: String,
    password_hash: String,
    role: String,
    permissions: serde_json::Value,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// An empty object means "no permission set".
fn permissions_to_value(permissions: Option<&PermissionSet>) -> Result<serde_json::Value, DbError> {
    match permissions {
        Some(set) => serde_json::to_value(set)
            .map_err(|e| DbError::InvalidRecord(format!("permissions: {e}"))),
        None => Ok(serde_json::Value::Object(Default::default())),
    }
}

fn permissions_from_value(value: serde_json::Value) -> Result<Option<PermissionSet>, DbError> {
    match &value {
        serde_json::Value::Object(map) if map.is_empty() => Ok(None),
        serde_json::Value::Null => Ok(None),
        _ => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| DbError::InvalidRecord(format!("permissions: {e}"))),
    }
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    match s.parse::<Role>() {
        Ok(role @ (Role::Admin | Role::Superadmin)) => Ok(role),
        _ => Err(DbError::InvalidRecord(format!("unexpected admin role: {s}"))),
    }
}

impl AdminRow {
    fn into_admin(self, id: Uuid) -> Result<AdminAccount, DbError> {
        Ok(AdminAccount {
            id,
            username: self.username,
            full_name: self.full_name,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            permissions: permissions_from_value(self.permissions)?,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AdminRowWithId {
    fn try_into_admin(self) -> Result<AdminAccount, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::InvalidRecord(format!("invalid UUID: {e}")))?;
        AdminRow {
            username: self.username,
            full_name: self.full_name,
            password_hash: self.password_hash,
            role: self.role,
            permissions: self.permissions,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_admin(id)
    }
}

/// SurrealDB implementation of the admin account repository.
#[derive(Clone)]
pub struct SurrealAdminRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealAdminRepository<C> {
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

impl<C: Connection> AdminRepository for SurrealAdminRepository<C> {
    async fn create(&self, input: CreateAdmin) -> AtriumResult<AdminAccount> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;
        let permissions = permissions_to_value(input.permissions.as_ref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('admin', $id) SET \
                 username = $username, full_name = $full_name, \
                 password_hash = $password_hash, role = $role, \
                 permissions = $permissions, active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("full_name", input.full_name))
            .bind(("password_hash", password_hash))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("permissions", permissions))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("admin", e))?;

        let rows: Vec<AdminRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "admin".into(),
            id: id_str,
        })?;

        Ok(row.into_admin(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> AtriumResult<AdminAccount> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('admin', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdminRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "admin".into(),
            id: id_str,
        })?;

        Ok(row.into_admin(id)?)
    }

    async fn get_active_by_username(&self, username: &str) -> AtriumResult<AdminAccount> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM admin \
                 WHERE username = $username AND active = true",
            )
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdminRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "admin".into(),
            id: format!("username={username}"),
        })?;

        Ok(row.try_into_admin()?)
    }

    async fn update(&self, id: Uuid, input: UpdateAdmin) -> AtriumResult<AdminAccount> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.full_name.is_some() {
            sets.push("full_name = $full_name");
        }
        if input.permissions.is_some() {
            sets.push("permissions = $permissions");
        }
        if input.active.is_some() {
            sets.push("active = $active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('admin', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(full_name) = input.full_name {
            builder = builder.bind(("full_name", full_name));
        }
        if let Some(permissions) = input.permissions {
            builder = builder.bind(("permissions", permissions_to_value(permissions.as_ref())?));
        }
        if let Some(active) = input.active {
            builder = builder.bind(("active", active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("admin", e))?;

        let rows: Vec<AdminRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "admin".into(),
            id: id_str,
        })?;

        Ok(row.into_admin(id)?)
    }

    async fn set_password(&self, id: Uuid, password: &str) -> AtriumResult<()> {
        let id_str = id.to_string();
        let password_hash = hash_password(password, self.pepper.as_deref())?;

        let mut result = self
            .db
            .query(
                "UPDATE type::record('admin', $id) SET \
                 password_hash = $password_hash, updated_at = time::now() \
                 RETURN AFTER",
            )
            .bind(("id", id_str.clone()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdminRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "admin".into(),
                id: id_str,
            }
            .into());
        }
        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> AtriumResult<PaginatedResult<AdminAccount>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM admin GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM admin \
                 ORDER BY username ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdminRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(AdminRowWithId::try_into_admin)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
