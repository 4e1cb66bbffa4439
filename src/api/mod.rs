//! Environment API collaborator
//!
//! Trait surface the store depends on, plus the payload types for the
//! five REST operations. The concrete adapter lives in [`rest`].

pub mod rest;

pub use rest::RestClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::VaultError;
use crate::types::{AuditLogEntry, DriftEvent, EnvStatus, Environment, Snapshot};

/// Freeze transition requested for an environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreezeAction {
    Freeze,
    Unfreeze,
}

impl FreezeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Freeze => "freeze",
            Self::Unfreeze => "unfreeze",
        }
    }
}

/// Filter for audit log fetches
#[derive(Debug, Clone)]
pub struct AuditQuery {
    pub environment_id: Option<String>,
    pub limit: u32,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            environment_id: None,
            limit: constants::DEFAULT_AUDIT_LOG_LIMIT,
        }
    }
}

/// Result of a snapshot capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotResult {
    pub snapshot: Snapshot,
    pub message: String,
}

/// Result of a freeze/unfreeze transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreezeResult {
    pub message: String,
    pub status: EnvStatus,
}

/// Result of a drift evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub drift_events: Vec<DriftEvent>,
    pub drift_score: u32,
}

/// Remote REST surface consumed by the store.
///
/// Adapters hold no vault state; every method acquires auth headers,
/// issues one request and returns the parsed payload or an error.
#[async_trait]
pub trait EnvironmentApi: Send + Sync {
    async fn list_environments(&self) -> Result<Vec<Environment>, VaultError>;

    async fn capture_snapshot(&self, environment_id: &str) -> Result<SnapshotResult, VaultError>;

    async fn check_drift(&self, environment_id: &str) -> Result<DriftReport, VaultError>;

    async fn set_freeze(
        &self,
        environment_id: &str,
        action: FreezeAction,
        actor: &str,
    ) -> Result<FreezeResult, VaultError>;

    async fn fetch_audit_log(&self, query: &AuditQuery) -> Result<Vec<AuditLogEntry>, VaultError>;
}
