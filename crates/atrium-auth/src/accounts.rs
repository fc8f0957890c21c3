//! Account administration.
//!
//! Every operation takes the acting principal and checks it through
//! [`Access`] before touching a repository. Admin accounts are managed
//! by superadmins only; tenant accounts by staff holding the
//! [`TENANTS_TABLE`] permission.

use atrium_core::authz::Access;
use atrium_core::error::{AtriumError, AtriumResult};
use atrium_core::lease::LeaseSummary;
use atrium_core::models::admin::{AdminAccount, CreateAdmin, UpdateAdmin};
use atrium_core::models::principal::{PermissionSet, Principal, Role};
use atrium_core::models::tenant::{CreateTenant, TenantAccount, UpdateTenant};
use atrium_core::repository::{AdminRepository, PaginatedResult, Pagination, TenantRepository};
use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::password;

/// Table identifier guarding tenant records.
pub const TENANTS_TABLE: &str = "tenants";

pub struct AccountService<A: AdminRepository, T: TenantRepository> {
    admins: A,
    tenants: T,
    config: AuthConfig,
}

impl<A: AdminRepository, T: TenantRepository> AccountService<A, T> {
    pub fn new(admins: A, tenants: T, config: AuthConfig) -> Self {
        Self {
            admins,
            tenants,
            config,
        }
    }

    // -------------------------------------------------------------------
    // Admin accounts
    // -------------------------------------------------------------------

    pub async fn create_admin(
        &self,
        actor: &Principal,
        input: CreateAdmin,
    ) -> AtriumResult<AdminAccount> {
        Access::from(actor).require_role(Role::Superadmin)?;
        if input.role == Role::Tenant {
            return Err(AtriumError::Validation {
                message: "admin accounts cannot hold the tenant role".into(),
            });
        }
        password::check_password_policy(&input.password, self.config.min_password_length)?;

        let admin = self.admins.create(input).await?;
        info!(actor = %actor.id, admin_id = %admin.id, role = %admin.role, "Admin created");
        Ok(admin)
    }

    pub async fn list_admins(
        &self,
        actor: &Principal,
        pagination: Pagination,
    ) -> AtriumResult<PaginatedResult<AdminAccount>> {
        Access::from(actor).require_role(Role::Superadmin)?;
        self.admins.list(pagination).await
    }

    pub async fn update_admin_permissions(
        &self,
        actor: &Principal,
        admin_id: Uuid,
        permissions: Option<PermissionSet>,
    ) -> AtriumResult<AdminAccount> {
        Access::from(actor).require_role(Role::Superadmin)?;
        self.admins
            .update(
                admin_id,
                UpdateAdmin {
                    permissions: Some(permissions),
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn deactivate_admin(&self, actor: &Principal, admin_id: Uuid) -> AtriumResult<()> {
        Access::from(actor).require_role(Role::Superadmin)?;
        if actor.id == admin_id {
            return Err(AtriumError::Validation {
                message: "cannot deactivate the signed-in account".into(),
            });
        }
        self.admins
            .update(
                admin_id,
                UpdateAdmin {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        info!(actor = %actor.id, admin_id = %admin_id, "Admin deactivated");
        Ok(())
    }

    pub async fn reset_admin_password(
        &self,
        actor: &Principal,
        admin_id: Uuid,
        new_password: &str,
    ) -> AtriumResult<()> {
        Access::from(actor).require_role(Role::Superadmin)?;
        password::check_password_policy(new_password, self.config.min_password_length)?;
        self.admins.set_password(admin_id, new_password).await?;
        info!(actor = %actor.id, admin_id = %admin_id, "Admin password reset");
        Ok(())
    }

    // -------------------------------------------------------------------
    // Tenant accounts
    // -------------------------------------------------------------------

    fn require_tenant_staff<'a>(&self, actor: &'a Principal) -> AtriumResult<&'a Principal> {
        let access = Access::from(actor);
        access.require_role(Role::STAFF)?;
        access.require_table(TENANTS_TABLE)
    }

    pub async fn create_tenant(
        &self,
        actor: &Principal,
        input: CreateTenant,
    ) -> AtriumResult<TenantAccount> {
        self.require_tenant_staff(actor)?;
        password::check_password_policy(&input.password, self.config.min_password_length)?;

        let tenant = self.tenants.create(input).await?;
        info!(actor = %actor.id, tenant_id = %tenant.id, unit = %tenant.unit, "Tenant created");
        Ok(tenant)
    }

    pub async fn list_tenants(
        &self,
        actor: &Principal,
        pagination: Pagination,
    ) -> AtriumResult<PaginatedResult<TenantAccount>> {
        self.require_tenant_staff(actor)?;
        self.tenants.list(pagination).await
    }

    pub async fn update_tenant(
        &self,
        actor: &Principal,
        tenant_id: Uuid,
        input: UpdateTenant,
    ) -> AtriumResult<TenantAccount> {
        self.require_tenant_staff(actor)?;
        self.tenants.update(tenant_id, input).await
    }

    pub async fn reset_tenant_password(
        &self,
        actor: &Principal,
        tenant_id: Uuid,
        new_password: &str,
    ) -> AtriumResult<()> {
        self.require_tenant_staff(actor)?;
        password::check_password_policy(new_password, self.config.min_password_length)?;
        self.tenants.set_password(tenant_id, new_password).await?;
        info!(actor = %actor.id, tenant_id = %tenant_id, "Tenant password reset");
        Ok(())
    }

    /// Record one rent payment of a full cycle.
    ///
    /// The first payment ever recorded anchors the cycle schedule at
    /// `paid_on`. Later payments each cover the next 30-day cycle.
    pub async fn record_rent_payment(
        &self,
        actor: &Principal,
        tenant_id: Uuid,
        paid_on: NaiveDate,
    ) -> AtriumResult<TenantAccount> {
        self.require_tenant_staff(actor)?;

        let lease = self.tenants.get_by_id(tenant_id).await?.lease;
        let update = match lease.first_payment_date {
            None => UpdateTenant {
                first_payment_date: Some(Some(paid_on)),
                cycles_paid: Some(1),
                ..Default::default()
            },
            Some(_) => UpdateTenant {
                cycles_paid: Some(lease.cycles_paid.max(1).saturating_add(1)),
                ..Default::default()
            },
        };

        let tenant = self.tenants.update(tenant_id, update).await?;
        info!(
            actor = %actor.id,
            tenant_id = %tenant_id,
            cycles_paid = tenant.lease.cycles_paid,
            "Rent payment recorded"
        );
        Ok(tenant)
    }

    /// Lease figures for one tenant as of `now`.
    ///
    /// Tenants may only read their own lease.
    pub async fn lease_summary(
        &self,
        actor: &Principal,
        tenant_id: Uuid,
        now: NaiveDate,
    ) -> AtriumResult<LeaseSummary> {
        let access = Access::from(actor);
        if access.has_role(Role::Tenant) {
            if actor.id != tenant_id {
                return Err(AtriumError::AuthorizationDenied {
                    reason: "tenants may only view their own lease".into(),
                });
            }
        } else {
            self.require_tenant_staff(actor)?;
        }

        let tenant = self.tenants.get_by_id(tenant_id).await?;
        Ok(LeaseSummary::compute(&tenant.lease, now))
    }
}
