//! Authorization model.
//!
//! Every access question in Atrium goes through [`Access`]: page
//! visibility, table visibility, role membership, and route guarding.
//! All checks are pure and fail closed. A missing principal or a
//! missing permission set always answers "no".

use crate::error::{AtriumError, AtriumResult};
use crate::models::principal::{Principal, Role};

/// Access checks for a possibly-absent principal.
#[derive(Debug, Clone, Copy)]
pub struct Access<'a> {
    principal: Option<&'a Principal>,
}

impl<'a> Access<'a> {
    pub fn new(principal: Option<&'a Principal>) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> Option<&'a Principal> {
        self.principal
    }

    /// May the principal navigate to `page`?
    ///
    /// Superadmins may always navigate. Everyone else needs the page in
    /// their permission set.
    pub fn has_page_permission(&self, page: &str) -> bool {
        match self.principal {
            None => false,
            Some(p) if p.role == Role::Superadmin => true,
            Some(p) => p
                .permissions
                .as_ref()
                .is_some_and(|set| set.pages.contains(page)),
        }
    }

    /// May the principal view `table`? Same contract as
    /// [`has_page_permission`](Self::has_page_permission).
    pub fn has_table_permission(&self, table: &str) -> bool {
        match self.principal {
            None => false,
            Some(p) if p.role == Role::Superadmin => true,
            Some(p) => p
                .permissions
                .as_ref()
                .is_some_and(|set| set.tables.contains(table)),
        }
    }

    /// Is the principal's role one of `roles`? Accepts a single
    /// [`Role`] or any list of roles.
    pub fn has_role(&self, roles: impl AsRef<[Role]>) -> bool {
        self.principal
            .is_some_and(|p| roles.as_ref().contains(&p.role))
    }

    /// Like [`has_role`](Self::has_role), returning the principal or an
    /// authorization error.
    pub fn require_role(&self, roles: impl AsRef<[Role]>) -> AtriumResult<&'a Principal> {
        let roles = roles.as_ref();
        match self.principal {
            Some(p) if roles.contains(&p.role) => Ok(p),
            Some(p) => Err(AtriumError::denied(format!(
                "role {} may not perform this action",
                p.role
            ))),
            None => Err(AtriumError::denied("no authenticated principal")),
        }
    }

    /// Returns the principal if it may view `table`.
    pub fn require_table(&self, table: &str) -> AtriumResult<&'a Principal> {
        match self.principal {
            Some(p) if self.has_table_permission(table) => Ok(p),
            Some(_) => Err(AtriumError::denied(format!("no access to table {table}"))),
            None => Err(AtriumError::denied("no authenticated principal")),
        }
    }

    /// Returns the principal if it may navigate to `page`.
    pub fn require_page(&self, page: &str) -> AtriumResult<&'a Principal> {
        match self.principal {
            Some(p) if self.has_page_permission(page) => Ok(p),
            Some(_) => Err(AtriumError::denied(format!("no access to page {page}"))),
            None => Err(AtriumError::denied("no authenticated principal")),
        }
    }
}

impl<'a> From<&'a Principal> for Access<'a> {
    fn from(principal: &'a Principal) -> Self {
        Self::new(Some(principal))
    }
}

/// State of principal resolution (session restore).
///
/// Starts as `Pending` and moves to `Resolved` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    Pending,
    Resolved(Option<Principal>),
}

impl Resolution {
    pub fn is_pending(&self) -> bool {
        matches!(self, Resolution::Pending)
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Resolution::Resolved(p) => p.as_ref(),
            Resolution::Pending => None,
        }
    }

    pub fn access(&self) -> Access<'_> {
        Access::new(self.principal())
    }
}

/// Outcome of a route guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Resolution still pending. Not terminal; check again once it
    /// resolves.
    Loading,
    Allow,
    RedirectToLogin,
    RedirectToUnauthorized,
}

/// Decide whether a route may render for the current resolution.
///
/// `required` is the route's set of acceptable roles, or `None` when
/// any authenticated principal may enter.
pub fn is_authorized(resolution: &Resolution, required: Option<&[Role]>) -> GuardDecision {
    let principal = match resolution {
        Resolution::Pending => return GuardDecision::Loading,
        Resolution::Resolved(None) => return GuardDecision::RedirectToLogin,
        Resolution::Resolved(Some(p)) => p,
    };

    match required {
        None => GuardDecision::Allow,
        Some(roles) if roles.contains(&principal.role) => GuardDecision::Allow,
        Some(_) => GuardDecision::RedirectToUnauthorized,
    }
}
