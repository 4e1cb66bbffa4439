//! Vault core errors
//!
//! Read operations on the store absorb these into a degraded outcome;
//! write operations propagate them unchanged to the caller.

/// Errors produced by the identity provider, the API client and the store.
#[derive(Debug, Clone)]
pub enum VaultError {
    /// No valid session, or sign-in/sign-up/sign-out failure
    Auth(String),
    /// Transport-level failure reaching the Environment API
    Network(String),
    /// Non-2xx response from the Environment API
    Api { status: u16, message: String },
    /// Response body could not be decoded
    Parse(String),
    /// A mutating operation is already in flight for this environment
    Busy(String),
    /// Rejected input (e.g. password policy violation)
    InvalidInput(String),
}

impl std::fmt::Display for VaultError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth(e) => write!(f, "Auth error: {}", e),
            Self::Network(e) => write!(f, "Network error: {}", e),
            Self::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
            Self::Busy(e) => write!(f, "Busy: {}", e),
            Self::InvalidInput(e) => write!(f, "Invalid input: {}", e),
        }
    }
}

impl std::error::Error for VaultError {}

impl VaultError {
    /// True for conditions worth retrying on idempotent reads.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
