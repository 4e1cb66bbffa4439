//! Runtime configuration for the vault core.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Configuration handed to the REST client and the console binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Environment API base URL
    pub api_endpoint: String,
    /// HTTP timeout in seconds
    pub timeout_seconds: u64,
    /// Actor recorded on mutating operations
    pub default_actor: String,
    /// Bounded retry count for idempotent read operations (GET only)
    pub read_retry_attempts: u32,
    /// Delay between read retries in milliseconds
    pub read_retry_delay_ms: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            api_endpoint: constants::get_api_endpoint(),
            timeout_seconds: constants::get_api_timeout(),
            default_actor: constants::get_default_actor(),
            read_retry_attempts: constants::get_read_retries(),
            read_retry_delay_ms: constants::get_read_retry_delay_ms(),
        }
    }
}
