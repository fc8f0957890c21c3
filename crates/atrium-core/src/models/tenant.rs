//! Tenant account and lease record models.
//!
//! A tenant account is a leaseholder's login. The lease fields live on
//! the same record; [`LeaseRecord`] is the subset the lease cycle
//! calculator needs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::{Principal, Role};

/// Dates and rent that drive the lease cycle calculation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaseRecord {
    pub registration_date: NaiveDate,
    /// On or after `registration_date` when present; not enforced.
    pub first_payment_date: Option<NaiveDate>,
    /// Monthly rent in minor currency units.
    pub monthly_rent_cents: u64,
    /// 30-day cycles covered by recorded payments, the first payment
    /// included.
    #[serde(default)]
    pub cycles_paid: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantAccount {
    pub id: Uuid,
    pub login_id: String,
    pub full_name: String,
    /// Unit or suite the tenant occupies (e.g. `4-B`).
    pub unit: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub lease: LeaseRecord,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantAccount {
    pub fn to_principal(&self) -> Principal {
        Principal {
            id: self.id,
            display_name: Some(self.login_id.clone()),
            role: Role::Tenant,
            permissions: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub login_id: String,
    pub full_name: String,
    pub unit: String,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
    pub lease: LeaseRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub full_name: Option<String>,
    pub unit: Option<String>,
    pub registration_date: Option<NaiveDate>,
    /// `Some(Some(d))` = set, `Some(None)` = clear, `None` = no change.
    pub first_payment_date: Option<Option<NaiveDate>>,
    pub monthly_rent_cents: Option<u64>,
    pub cycles_paid: Option<u32>,
    pub active: Option<bool>,
}
