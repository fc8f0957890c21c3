//! Principal, role, and permission-set models.
//!
//! A principal is the authenticated actor for the current session. It
//! is produced by a successful login, persisted with the session, and
//! discarded at logout.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AtriumError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Tenant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Tenant => "tenant",
        }
    }

    /// Roles held by building staff.
    pub const STAFF: [Role; 2] = [Role::Admin, Role::Superadmin];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AtriumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Role::Superadmin),
            "admin" => Ok(Role::Admin),
            "tenant" => Ok(Role::Tenant),
            other => Err(AtriumError::Validation {
                message: format!("unknown role: {other}"),
            }),
        }
    }
}

/// A single role behaves as a one-element role list.
impl AsRef<[Role]> for Role {
    fn as_ref(&self) -> &[Role] {
        std::slice::from_ref(self)
    }
}

/// Tables and pages a non-superadmin principal may access.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionSet {
    #[serde(default)]
    pub tables: BTreeSet<String>,
    #[serde(default)]
    pub pages: BTreeSet<String>,
}

impl PermissionSet {
    pub fn new<T, P>(tables: T, pages: P) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    /// Account id. For tenants this is also the lease record id.
    pub id: Uuid,
    /// Admin username or tenant login id.
    pub display_name: Option<String>,
    pub role: Role,
    pub permissions: Option<PermissionSet>,
}
