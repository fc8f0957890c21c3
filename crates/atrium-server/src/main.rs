//! Atrium Server: Application entry point.

mod config;

use atrium_auth::{AuthError, AuthService};
use atrium_core::authz::{GuardDecision, is_authorized};
use atrium_core::error::AtriumError;
use atrium_core::models::admin::CreateAdmin;
use atrium_core::models::principal::Role;
use atrium_core::options::OptionCatalog;
use atrium_core::repository::AdminRepository;
use atrium_db::repository::{
    SurrealAdminRepository, SurrealOptionRepository, SurrealSessionStore, SurrealTenantRepository,
};
use atrium_db::{DbError, DbManager};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{BootstrapAdmin, ServerConfig};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Atrium(#[from] AtriumError),
}

impl From<AuthError> for ServerError {
    fn from(err: AuthError) -> Self {
        Self::Atrium(err.into())
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("atrium=info".parse().unwrap()))
        .json()
        .init();

    info!("Starting Atrium server...");

    match run().await {
        Ok(()) => {
            info!("Atrium server stopped.");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Atrium server failed");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::from_env()?;

    let db = DbManager::open(&config.db).await?.into_client();
    let pepper = config.auth.pepper.clone();
    let (admins, tenants) = match pepper {
        Some(p) => (
            SurrealAdminRepository::with_pepper(db.clone(), p.clone()),
            SurrealTenantRepository::with_pepper(db.clone(), p),
        ),
        None => (
            SurrealAdminRepository::new(db.clone()),
            SurrealTenantRepository::new(db.clone()),
        ),
    };

    if let Some(bootstrap) = &config.bootstrap {
        bootstrap_superadmin(&admins, bootstrap, config.auth.min_password_length).await?;
    }

    let auth = AuthService::new(
        admins,
        tenants,
        SurrealSessionStore::new(db.clone()),
        config.auth.clone(),
    );
    let resolution = auth.session().restore().await;
    match is_authorized(&resolution, Some(&Role::STAFF)) {
        GuardDecision::Allow => info!("Restored staff session"),
        GuardDecision::RedirectToUnauthorized => info!("Restored tenant session"),
        _ => info!("No persisted session"),
    }

    let catalog = OptionCatalog::load(SurrealOptionRepository::new(db)).await?;
    info!(categories = catalog.snapshot().len(), "Option catalog ready");

    Ok(())
}

/// Create the configured superadmin unless an account with that
/// username already exists. A deactivated holder of the username is
/// left alone.
async fn bootstrap_superadmin<R: AdminRepository>(
    admins: &R,
    bootstrap: &BootstrapAdmin,
    min_password_length: usize,
) -> Result<(), ServerError> {
    match admins.get_active_by_username(&bootstrap.username).await {
        Ok(existing) => {
            info!(admin_id = %existing.id, "Bootstrap superadmin already present");
            return Ok(());
        }
        Err(AtriumError::NotFound { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    atrium_auth::password::check_password_policy(&bootstrap.password, min_password_length)?;
    let created = admins
        .create(CreateAdmin {
            username: bootstrap.username.clone(),
            full_name: bootstrap.username.clone(),
            password: bootstrap.password.clone(),
            role: Role::Superadmin,
            permissions: None,
        })
        .await;
    match created {
        Ok(admin) => info!(admin_id = %admin.id, "Bootstrap superadmin created"),
        Err(AtriumError::AlreadyExists { .. }) => {
            warn!(
                username = %bootstrap.username,
                "Bootstrap username belongs to an inactive admin; skipping"
            );
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::models::admin::UpdateAdmin;
    use atrium_core::repository::Pagination;
    use atrium_db::DbConfig;

    fn owner() -> BootstrapAdmin {
        BootstrapAdmin {
            username: "owner".into(),
            password: "rooftop-master-key".into(),
        }
    }

    async fn admins() -> impl AdminRepository {
        let db = DbManager::open(&DbConfig::in_memory())
            .await
            .unwrap()
            .into_client();
        SurrealAdminRepository::new(db)
    }

    #[tokio::test]
    async fn bootstrap_creates_once() {
        let repo = admins().await;
        bootstrap_superadmin(&repo, &owner(), 12).await.unwrap();
        bootstrap_superadmin(&repo, &owner(), 12).await.unwrap();

        let page = repo.list(Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].role, Role::Superadmin);
    }

    #[tokio::test]
    async fn bootstrap_skips_deactivated_username() {
        let repo = admins().await;
        bootstrap_superadmin(&repo, &owner(), 12).await.unwrap();
        let existing = repo.get_active_by_username("owner").await.unwrap();
        repo.update(
            existing.id,
            UpdateAdmin {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        bootstrap_superadmin(&repo, &owner(), 12).await.unwrap();
        assert!(!repo.get_by_id(existing.id).await.unwrap().active);
    }

    #[tokio::test]
    async fn bootstrap_enforces_password_policy() {
        let repo = admins().await;
        let weak = BootstrapAdmin {
            username: "owner".into(),
            password: "short".into(),
        };
        assert!(bootstrap_superadmin(&repo, &weak, 12).await.is_err());
    }
}
