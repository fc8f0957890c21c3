//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups used by login are
//! filtered by the account's `active` flag at the query level.

use uuid::Uuid;

use crate::error::AtriumResult;
use crate::models::{
    admin::{AdminAccount, CreateAdmin, UpdateAdmin},
    option_list::OptionList,
    tenant::{CreateTenant, TenantAccount, UpdateTenant},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub trait AdminRepository: Send + Sync {
    fn create(&self, input: CreateAdmin) -> impl Future<Output = AtriumResult<AdminAccount>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = AtriumResult<AdminAccount>> + Send;
    /// Look up an active admin by username. Inactive admins are
    /// reported as not found.
    fn get_active_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = AtriumResult<AdminAccount>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateAdmin,
    ) -> impl Future<Output = AtriumResult<AdminAccount>> + Send;
    /// Hash `password` with a fresh salt and store it.
    fn set_password(&self, id: Uuid, password: &str)
    -> impl Future<Output = AtriumResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = AtriumResult<PaginatedResult<AdminAccount>>> + Send;
}

pub trait TenantRepository: Send + Sync {
    fn create(
        &self,
        input: CreateTenant,
    ) -> impl Future<Output = AtriumResult<TenantAccount>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = AtriumResult<TenantAccount>> + Send;
    /// Look up an active tenant by login id. Inactive tenants are
    /// reported as not found.
    fn get_active_by_login_id(
        &self,
        login_id: &str,
    ) -> impl Future<Output = AtriumResult<TenantAccount>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = AtriumResult<TenantAccount>> + Send;
    /// Hash `password` with a fresh salt and store it.
    fn set_password(&self, id: Uuid, password: &str)
    -> impl Future<Output = AtriumResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = AtriumResult<PaginatedResult<TenantAccount>>> + Send;
}

// ---------------------------------------------------------------------------
// Session storage & configuration
// ---------------------------------------------------------------------------

/// Durable key/value storage for persisted sessions.
pub trait SessionStore: Send + Sync {
    fn read(&self, key: &str) -> impl Future<Output = AtriumResult<Option<String>>> + Send;
    fn write(&self, key: &str, value: String) -> impl Future<Output = AtriumResult<()>> + Send;
    fn clear(&self, key: &str) -> impl Future<Output = AtriumResult<()>> + Send;
}

pub trait OptionRepository: Send + Sync {
    fn load_all(&self) -> impl Future<Output = AtriumResult<Vec<OptionList>>> + Send;
    /// Insert or replace the list for `list.category`.
    fn save(&self, list: OptionList) -> impl Future<Output = AtriumResult<()>> + Send;
}
