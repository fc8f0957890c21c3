//! Admin account domain model.
//!
//! Admin accounts cover both `admin` and `superadmin` principals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::{PermissionSet, Principal, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAccount {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Either [`Role::Admin`] or [`Role::Superadmin`].
    pub role: Role,
    pub permissions: Option<PermissionSet>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminAccount {
    pub fn to_principal(&self) -> Principal {
        Principal {
            id: self.id,
            display_name: Some(self.username.clone()),
            role: self.role,
            permissions: self.permissions.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdmin {
    pub username: String,
    pub full_name: String,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
    pub role: Role,
    pub permissions: Option<PermissionSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAdmin {
    pub full_name: Option<String>,
    /// `Some(Some(set))` = replace, `Some(None)` = clear, `None` = no change.
    pub permissions: Option<Option<PermissionSet>>,
    pub active: Option<bool>,
}
