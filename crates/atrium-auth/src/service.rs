//! Authentication service: login, logout and password changes.

use atrium_core::error::{AtriumError, AtriumResult};
use atrium_core::models::principal::{Principal, Role};
use atrium_core::repository::{AdminRepository, SessionStore, TenantRepository};
use tracing::{error, info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::session::SessionManager;

/// Which account table a login targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Admin,
    Tenant,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub user_type: UserType,
    /// Admin username or tenant login id.
    pub identifier: String,
    pub password: String,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<A: AdminRepository, T: TenantRepository, S: SessionStore> {
    admins: A,
    tenants: T,
    session: SessionManager<S>,
    config: AuthConfig,
}

impl<A, T, S> AuthService<A, T, S>
where
    A: AdminRepository,
    T: TenantRepository,
    S: SessionStore,
{
    pub fn new(admins: A, tenants: T, store: S, config: AuthConfig) -> Self {
        Self {
            admins,
            tenants,
            session: SessionManager::new(store, config.clone()),
            config,
        }
    }

    pub fn session(&self) -> &SessionManager<S> {
        &self.session
    }

    /// Verify credentials and establish a session.
    ///
    /// Unknown identifiers, inactive accounts and wrong passwords all
    /// fail with the same `invalid credentials` error.
    pub async fn login(&self, input: LoginInput) -> AtriumResult<Principal> {
        let (principal, password_hash) = match self.lookup(&input).await {
            Ok(found) => found,
            Err(AtriumError::NotFound { .. }) => {
                warn!(user_type = ?input.user_type, "Login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = match password::verify_password(
            &input.password,
            &password_hash,
            self.config.pepper.as_deref(),
        ) {
            Ok(valid) => valid,
            Err(e) => {
                error!(principal_id = %principal.id, error = %e, "Stored password hash is unusable");
                false
            }
        };

        if !valid {
            warn!(user_type = ?input.user_type, "Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        self.session.establish(principal.clone()).await?;
        info!(principal_id = %principal.id, role = %principal.role, "Login succeeded");
        Ok(principal)
    }

    async fn lookup(&self, input: &LoginInput) -> AtriumResult<(Principal, String)> {
        match input.user_type {
            UserType::Admin => {
                let admin = self
                    .admins
                    .get_active_by_username(&input.identifier)
                    .await?;
                Ok((admin.to_principal(), admin.password_hash))
            }
            UserType::Tenant => {
                let tenant = self
                    .tenants
                    .get_active_by_login_id(&input.identifier)
                    .await?;
                Ok((tenant.to_principal(), tenant.password_hash))
            }
        }
    }

    /// End the current session.
    pub async fn logout(&self) -> AtriumResult<()> {
        if let Some(p) = self.session.principal() {
            info!(principal_id = %p.id, "Logout");
        }
        self.session.clear().await
    }

    /// Change the signed-in principal's own password after verifying
    /// the current one.
    pub async fn change_own_password(&self, current: &str, new: &str) -> AtriumResult<()> {
        let principal = self.session.principal().ok_or(AuthError::NotSignedIn)?;
        password::check_password_policy(new, self.config.min_password_length)?;

        let stored_hash = match principal.role {
            Role::Tenant => self.tenants.get_by_id(principal.id).await?.password_hash,
            Role::Admin | Role::Superadmin => {
                self.admins.get_by_id(principal.id).await?.password_hash
            }
        };

        if !password::verify_password(current, &stored_hash, self.config.pepper.as_deref())? {
            return Err(AuthError::InvalidCredentials.into());
        }

        match principal.role {
            Role::Tenant => self.tenants.set_password(principal.id, new).await?,
            Role::Admin | Role::Superadmin => self.admins.set_password(principal.id, new).await?,
        }
        info!(principal_id = %principal.id, "Password changed");
        Ok(())
    }
}
