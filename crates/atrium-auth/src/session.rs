//! Session persistence and principal resolution.
//!
//! The manager starts in [`Resolution::Pending`]. [`SessionManager::restore`]
//! reads the persisted token once and moves to `Resolved`; anything it
//! cannot verify is cleared and treated as "no session". Subscribers
//! can watch the transition through [`SessionManager::subscribe`].

use atrium_core::authz::Resolution;
use atrium_core::error::AtriumResult;
use atrium_core::models::principal::Principal;
use atrium_core::repository::SessionStore;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::token;

pub struct SessionManager<S: SessionStore> {
    store: S,
    config: AuthConfig,
    state: watch::Sender<Resolution>,
    restore_lock: Mutex<()>,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S, config: AuthConfig) -> Self {
        Self {
            store,
            config,
            state: watch::Sender::new(Resolution::Pending),
            restore_lock: Mutex::new(()),
        }
    }

    /// Current resolution state.
    pub fn resolution(&self) -> Resolution {
        self.state.borrow().clone()
    }

    /// Resolved principal, if any.
    pub fn principal(&self) -> Option<Principal> {
        self.state.borrow().principal().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Resolution> {
        self.state.subscribe()
    }

    /// Wait until resolution has completed and return the outcome.
    pub async fn resolved(&self) -> Resolution {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|r| !r.is_pending()).await {
            Ok(resolution) => resolution.clone(),
            // The sender lives in `self`, so it cannot be gone here.
            Err(_) => self.resolution(),
        }
    }

    /// Restore the persisted session.
    ///
    /// Runs at most once: later calls return the existing resolution.
    /// Storage read failures and unverifiable tokens both resolve to
    /// "no session".
    pub async fn restore(&self) -> Resolution {
        let _guard = self.restore_lock.lock().await;
        if !self.state.borrow().is_pending() {
            return self.resolution();
        }

        let principal = match self.store.read(&self.config.session_key).await {
            Ok(Some(raw)) => self.decode_or_discard(&raw).await,
            Ok(None) => {
                debug!("No persisted session");
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session");
                None
            }
        };

        if let Some(p) = &principal {
            info!(principal_id = %p.id, role = %p.role, "Session restored");
        }
        let resolution = Resolution::Resolved(principal);
        self.state.send_replace(resolution.clone());
        resolution
    }

    async fn decode_or_discard(&self, raw: &str) -> Option<Principal> {
        let decoded = token::decode_session_token(raw, &self.config)
            .and_then(|claims| claims.into_principal());
        match decoded {
            Ok(principal) => Some(principal),
            Err(e) => {
                warn!(error = %e, "Discarding unusable persisted session");
                if let Err(e) = self.store.clear(&self.config.session_key).await {
                    warn!(error = %e, "Failed to clear persisted session");
                }
                None
            }
        }
    }

    /// Persist `principal` as the active session.
    pub async fn establish(&self, principal: Principal) -> AtriumResult<()> {
        let token = token::issue_session_token(&principal, &self.config)?;
        self.store.write(&self.config.session_key, token).await?;
        self.state.send_replace(Resolution::Resolved(Some(principal)));
        Ok(())
    }

    /// Drop the persisted entry and the in-memory principal.
    pub async fn clear(&self) -> AtriumResult<()> {
        self.store.clear(&self.config.session_key).await?;
        self.state.send_replace(Resolution::Resolved(None));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tests::test_config;
    use atrium_core::authz::{GuardDecision, is_authorized};
    use atrium_core::models::principal::Role;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct MemoryStore {
        entries: StdMutex<HashMap<String, String>>,
    }

    impl MemoryStore {
        fn with(key: &str, value: &str) -> Self {
            let store = Self::default();
            store
                .entries
                .lock()
                .unwrap()
                .insert(key.into(), value.into());
            store
        }

        fn get(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }
    }

    impl SessionStore for MemoryStore {
        async fn read(&self, key: &str) -> AtriumResult<Option<String>> {
            Ok(self.get(key))
        }

        async fn write(&self, key: &str, value: String) -> AtriumResult<()> {
            self.entries.lock().unwrap().insert(key.into(), value);
            Ok(())
        }

        async fn clear(&self, key: &str) -> AtriumResult<()> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn tenant() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            display_name: Some("unit-4b".into()),
            role: Role::Tenant,
            permissions: None,
        }
    }

    #[tokio::test]
    async fn starts_pending_then_resolves_empty() {
        let manager = SessionManager::new(MemoryStore::default(), test_config());
        assert!(manager.resolution().is_pending());
        assert_eq!(
            is_authorized(&manager.resolution(), None),
            GuardDecision::Loading
        );

        let resolution = manager.restore().await;
        assert_eq!(resolution, Resolution::Resolved(None));
        assert_eq!(
            is_authorized(&resolution, Some(&[Role::Tenant])),
            GuardDecision::RedirectToLogin
        );
    }

    #[tokio::test]
    async fn establish_then_restore_in_new_manager() {
        let config = test_config();
        let first = SessionManager::new(MemoryStore::default(), config.clone());
        let principal = tenant();
        first.establish(principal.clone()).await.unwrap();
        let raw = first.store.get(&config.session_key).unwrap();

        let second = SessionManager::new(MemoryStore::with(&config.session_key, &raw), config);
        let resolution = second.restore().await;
        assert_eq!(resolution.principal(), Some(&principal));
    }

    #[tokio::test]
    async fn malformed_session_is_discarded() {
        let config = test_config();
        let store = MemoryStore::with(&config.session_key, "{not json at all");
        let manager = SessionManager::new(store, config.clone());

        assert_eq!(manager.restore().await, Resolution::Resolved(None));
        assert_eq!(manager.store.get(&config.session_key), None);
    }

    #[tokio::test]
    async fn restore_runs_once() {
        let config = test_config();
        let manager = SessionManager::new(MemoryStore::default(), config.clone());
        manager.restore().await;

        // A token appearing later is not picked up by a second restore.
        let token = token::issue_session_token(&tenant(), &config).unwrap();
        manager
            .store
            .write(&config.session_key, token)
            .await
            .unwrap();
        assert_eq!(manager.restore().await, Resolution::Resolved(None));
    }

    #[tokio::test]
    async fn subscribers_see_resolution() {
        let manager = SessionManager::new(MemoryStore::default(), test_config());
        let mut rx = manager.subscribe();
        assert!(rx.borrow().is_pending());

        manager.restore().await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Resolution::Resolved(None));
        assert_eq!(manager.resolved().await, Resolution::Resolved(None));
    }

    #[tokio::test]
    async fn clear_forgets_principal() {
        let config = test_config();
        let manager = SessionManager::new(MemoryStore::default(), config.clone());
        manager.establish(tenant()).await.unwrap();
        assert!(manager.principal().is_some());

        manager.clear().await.unwrap();
        assert_eq!(manager.principal(), None);
        assert_eq!(manager.store.get(&config.session_key), None);
    }
}
