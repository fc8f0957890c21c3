//! Server configuration loaded from `ATRIUM_*` environment variables.
//!
//! Anything unset falls back to the `Default` impls of [`DbConfig`] and
//! [`AuthConfig`].

use std::env;
use std::fs;

use atrium_auth::AuthConfig;
use atrium_db::DbConfig;

use crate::ServerError;

/// Superadmin account created on first start when no such account exists.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub bootstrap: Option<BootstrapAdmin>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let mut config = Self::default();

        if let Some(url) = get("ATRIUM_DB_URL") {
            config.db.url = url;
        }
        if let Some(ns) = get("ATRIUM_DB_NAMESPACE") {
            config.db.namespace = ns;
        }
        if let Some(database) = get("ATRIUM_DB_DATABASE") {
            config.db.database = database;
        }
        if let Some(user) = get("ATRIUM_DB_USERNAME") {
            config.db.username = user;
        }
        if let Some(password) = get("ATRIUM_DB_PASSWORD") {
            config.db.password = password;
        }

        if let Some(path) = get("ATRIUM_JWT_PRIVATE_KEY_FILE") {
            config.auth.jwt_private_key_pem = read_key(&path)?;
        }
        if let Some(path) = get("ATRIUM_JWT_PUBLIC_KEY_FILE") {
            config.auth.jwt_public_key_pem = read_key(&path)?;
        }
        if let Some(issuer) = get("ATRIUM_JWT_ISSUER") {
            config.auth.jwt_issuer = issuer;
        }
        if let Some(secs) = get("ATRIUM_SESSION_LIFETIME_SECS") {
            config.auth.session_lifetime_secs = parse_number("ATRIUM_SESSION_LIFETIME_SECS", &secs)?;
        }
        if let Some(len) = get("ATRIUM_MIN_PASSWORD_LENGTH") {
            config.auth.min_password_length = parse_number("ATRIUM_MIN_PASSWORD_LENGTH", &len)?;
        }
        config.auth.pepper = get("ATRIUM_PASSWORD_PEPPER").filter(|p| !p.is_empty());

        config.bootstrap = match (
            get("ATRIUM_BOOTSTRAP_USERNAME"),
            get("ATRIUM_BOOTSTRAP_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(BootstrapAdmin { username, password }),
            (None, None) => None,
            _ => {
                return Err(ServerError::Config(
                    "ATRIUM_BOOTSTRAP_USERNAME and ATRIUM_BOOTSTRAP_PASSWORD must be set together"
                        .into(),
                ));
            }
        };

        Ok(config)
    }
}

fn read_key(path: &str) -> Result<String, ServerError> {
    fs::read_to_string(path).map_err(|e| ServerError::Config(format!("reading {path}: {e}")))
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ServerError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ServerError::Config(format!("{key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ServerError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let config = load(&[]).unwrap();
        assert_eq!(config.db.namespace, "atrium");
        assert_eq!(config.auth.min_password_length, 12);
        assert!(config.auth.pepper.is_none());
        assert!(config.bootstrap.is_none());
    }

    #[test]
    fn overrides_apply() {
        let config = load(&[
            ("ATRIUM_DB_URL", "db.internal:8000"),
            ("ATRIUM_MIN_PASSWORD_LENGTH", "16"),
            ("ATRIUM_PASSWORD_PEPPER", "pepper"),
            ("ATRIUM_BOOTSTRAP_USERNAME", "owner"),
            ("ATRIUM_BOOTSTRAP_PASSWORD", "change-me-immediately"),
        ])
        .unwrap();
        assert_eq!(config.db.url, "db.internal:8000");
        assert_eq!(config.auth.min_password_length, 16);
        assert_eq!(config.auth.pepper.as_deref(), Some("pepper"));
        assert_eq!(config.bootstrap.unwrap().username, "owner");
    }

    #[test]
    fn memory_url_selects_embedded_engine() {
        let config = load(&[("ATRIUM_DB_URL", atrium_db::MEMORY_URL)]).unwrap();
        assert_eq!(config.db.url, "mem://");
    }

    #[test]
    fn bad_number_is_rejected() {
        assert!(load(&[("ATRIUM_SESSION_LIFETIME_SECS", "soon")]).is_err());
    }

    #[test]
    fn half_bootstrap_is_rejected() {
        assert!(load(&[("ATRIUM_BOOTSTRAP_USERNAME", "owner")]).is_err());
    }

    #[test]
    fn missing_key_file_is_reported() {
        let err = load(&[("ATRIUM_JWT_PRIVATE_KEY_FILE", "/nonexistent/key.pem")]).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/key.pem"));
    }
}
