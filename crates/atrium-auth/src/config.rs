//! Authentication configuration.

/// Storage key under which the signed session token is persisted.
pub const DEFAULT_SESSION_KEY: &str = "atrium.session";

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for session token signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for session token verification.
    pub jwt_public_key_pem: String,
    /// Session token lifetime in seconds (default: 604_800 = 7 days).
    pub session_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Optional pepper prepended to passwords before Argon2id verification.
    pub pepper: Option<String>,
    /// Minimum password length for policy enforcement.
    pub min_password_length: usize,
    /// Key in session storage holding the persisted session.
    pub session_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            session_lifetime_secs: 604_800,
            jwt_issuer: "atrium".into(),
            pepper: None,
            min_password_length: 12,
            session_key: DEFAULT_SESSION_KEY.into(),
        }
    }
}
