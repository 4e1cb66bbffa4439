//! Identity Provider collaborator
//!
//! The vault never authenticates users itself; it talks to a provider
//! behind this trait. Production deployments point it at a managed
//! identity service, tests and offline demos use [`LocalDirectory`].

pub mod directory;

pub use directory::LocalDirectory;

use async_trait::async_trait;

use crate::error::VaultError;

/// Minimum password length accepted at sign-up
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Bearer token for an authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

/// External identity collaborator.
///
/// Auth failures are surfaced directly to the caller and never absorbed
/// by the store.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Token for the current session, or an auth error if none exists
    async fn current_session(&self) -> Result<SessionToken, VaultError>;

    async fn sign_in(&self, username: &str, password: &str) -> Result<SessionToken, VaultError>;

    async fn sign_up(&self, username: &str, password: &str, email: &str)
        -> Result<(), VaultError>;

    async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<(), VaultError>;

    async fn sign_out(&self) -> Result<(), VaultError>;
}

/// Check a candidate password against the provider policy: at least
/// eight characters with one upper-case, one lower-case and one digit.
pub fn validate_password(password: &str) -> Result<(), VaultError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(VaultError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(VaultError::InvalidInput(
            "Password must contain an upper-case letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(VaultError::InvalidInput(
            "Password must contain a lower-case letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(VaultError::InvalidInput(
            "Password must contain a digit".to_string(),
        ));
    }
    Ok(())
}

/// Provider wrapping a fixed, pre-issued token.
///
/// Useful when a token is handed to the process out of band (demo
/// console, integration tests). Sign-in/sign-up are not supported.
#[derive(Debug, Clone)]
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: if token.is_empty() { None } else { Some(token) },
        }
    }

    /// A provider with no session at all; every API call will fail auth.
    pub fn unauthenticated() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl IdentityProvider for StaticSession {
    async fn current_session(&self) -> Result<SessionToken, VaultError> {
        match &self.token {
            Some(token) => Ok(SessionToken::new(token.clone())),
            None => Err(VaultError::Auth("no valid session".to_string())),
        }
    }

    async fn sign_in(&self, _username: &str, _password: &str) -> Result<SessionToken, VaultError> {
        Err(VaultError::Auth(
            "static session provider does not support sign-in".to_string(),
        ))
    }

    async fn sign_up(
        &self,
        _username: &str,
        _password: &str,
        _email: &str,
    ) -> Result<(), VaultError> {
        Err(VaultError::Auth(
            "static session provider does not support sign-up".to_string(),
        ))
    }

    async fn confirm_sign_up(&self, _username: &str, _code: &str) -> Result<(), VaultError> {
        Err(VaultError::Auth(
            "static session provider does not support sign-up".to_string(),
        ))
    }

    async fn sign_out(&self) -> Result<(), VaultError> {
        Ok(())
    }
}
