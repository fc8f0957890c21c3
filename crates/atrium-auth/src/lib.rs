//! Atrium Auth: credential verification, persisted sessions, and
//! account administration.

pub mod accounts;
pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod session;
pub mod token;

pub use accounts::AccountService;
pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, LoginInput, UserType};
pub use session::SessionManager;
