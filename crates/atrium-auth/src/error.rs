//! Authentication error types.

use atrium_core::error::AtriumError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown identifier, inactive account, and wrong password all
    /// collapse into this variant.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },

    #[error("no active session")]
    NotSignedIn,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for AtriumError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::NotSignedIn
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => AtriumError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::WeakPassword { .. } => AtriumError::Validation {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => AtriumError::Crypto(msg),
        }
    }
}
