//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default Environment API endpoint, only edit this file.

/// Default Environment API endpoint
///
/// This is the fallback URL when no environment variable is set.
/// For development: http://localhost:4000
/// For production: the deployed vault API gateway
pub const DEFAULT_API_ENDPOINT: &str = "https://api.vault.west-tek.io";

/// Default HTTP timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default actor recorded on mutating operations when no user is signed in
pub const DEFAULT_ACTOR: &str = "System";

/// Default number of retries for idempotent read operations
pub const DEFAULT_READ_RETRIES: u32 = 2;

/// Default delay between read retries (milliseconds)
pub const DEFAULT_READ_RETRY_DELAY_MS: u64 = 250;

/// Default audit log page size
pub const DEFAULT_AUDIT_LOG_LIMIT: u32 = 50;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Research Environment Vault";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get the Environment API endpoint from environment or use default
pub fn get_api_endpoint() -> String {
    std::env::var("VAULT_API_ENDPOINT").unwrap_or_else(|_| DEFAULT_API_ENDPOINT.to_string())
}

/// Get the HTTP timeout from environment or use default
pub fn get_api_timeout() -> u64 {
    std::env::var("VAULT_API_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

/// Get the default actor name from environment or use default
pub fn get_default_actor() -> String {
    std::env::var("VAULT_ACTOR").unwrap_or_else(|_| DEFAULT_ACTOR.to_string())
}

/// Get the read retry count from environment or use default
pub fn get_read_retries() -> u32 {
    std::env::var("VAULT_READ_RETRIES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_READ_RETRIES)
}

/// Get the read retry delay from environment or use default
pub fn get_read_retry_delay_ms() -> u64 {
    std::env::var("VAULT_READ_RETRY_DELAY_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_READ_RETRY_DELAY_MS)
}
