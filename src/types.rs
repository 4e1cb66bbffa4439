//! Vault data model
//!
//! Wire types shared between the store, the Environment API client and the
//! bundled simulation dataset. Field names follow the REST surface
//! (camelCase) so records round-trip through the API unchanged.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Timestamp format used across the vault ("2077.10.23 14:32:01")
pub const VAULT_TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// Current time in vault display format
pub fn vault_timestamp() -> String {
    Utc::now().format(VAULT_TIMESTAMP_FORMAT).to_string()
}

// ============================================================================
// ENVIRONMENT
// ============================================================================

/// Lifecycle state of a research environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvStatus {
    Active,
    Frozen,
    Staging,
    Archived,
}

impl EnvStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Frozen => "FROZEN",
            Self::Staging => "STAGING",
            Self::Archived => "ARCHIVED",
        }
    }
}

/// Researcher assigned to an environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Researcher {
    pub name: String,
    pub role: String,
}

/// A tracked research lab configuration record.
///
/// `drift_score` is `None` only when no snapshot/baseline exists yet
/// (e.g. STAGING environments). Freeze enforcement lives in the remote
/// API; the store respects whatever the API returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: String,
    pub lab_name: String,
    pub facility: String,
    pub researcher: Researcher,
    pub experiment_id: String,
    pub experiment_name: String,
    pub status: EnvStatus,
    #[serde(default)]
    pub drift_score: Option<u32>,
    #[serde(default)]
    pub last_snapshot_at: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub constraints: Vec<String>,
    pub cloudformation_stack_name: String,
    pub cloudformation_stack_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
}

/// Partial update for an environment record.
///
/// Only fields set to `Some` are merged; everything else is left
/// untouched, so applying a sequence of patches composes field-wise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EnvStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_snapshot_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudformation_stack_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
}

impl EnvironmentPatch {
    /// Merge this patch into `env`, field by field.
    pub fn apply_to(&self, env: &mut Environment) {
        if let Some(status) = self.status {
            env.status = status;
        }
        if let Some(score) = self.drift_score {
            env.drift_score = Some(score);
        }
        if let Some(ref ts) = self.last_snapshot_at {
            env.last_snapshot_at = Some(ts.clone());
        }
        if let Some(ref constraints) = self.constraints {
            env.constraints = constraints.clone();
        }
        if let Some(ref stack_status) = self.cloudformation_stack_status {
            env.cloudformation_stack_status = stack_status.clone();
        }
        if let Some(ref workspace_id) = self.workspace_id {
            env.workspace_id = Some(workspace_id.clone());
        }
    }
}

// ============================================================================
// DRIFT
// ============================================================================

/// Severity of a detected drift event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftSeverity {
    Info,
    Warning,
    Critical,
}

impl DriftSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

/// One detected deviation between expected and actual configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftEvent {
    pub id: String,
    pub environment_id: String,
    pub detected_at: String,
    pub severity: DriftSeverity,
    pub parameter: String,
    pub expected_value: String,
    pub actual_value: String,
    pub category: String,
    pub resolved: bool,
}

// ============================================================================
// AUDIT LOG
// ============================================================================

/// Enumerated audit actions recorded by the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    SnapshotCaptured,
    DriftDetected,
    EnvFrozen,
    EnvUnfrozen,
    StateChanged,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SnapshotCaptured => "SNAPSHOT_CAPTURED",
            Self::DriftDetected => "DRIFT_DETECTED",
            Self::EnvFrozen => "ENV_FROZEN",
            Self::EnvUnfrozen => "ENV_UNFROZEN",
            Self::StateChanged => "STATE_CHANGED",
        }
    }
}

/// Audit entry severity (lower-case on the wire, unlike drift severity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Info,
    Warning,
    Critical,
}

/// Immutable append-only record of an action taken by an actor.
///
/// Entries are never mutated or deleted after creation; locally added
/// entries are prepended (most-recent-first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub timestamp: String,
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,
    pub action: AuditAction,
    pub details: String,
    pub severity: LogSeverity,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Installed package captured in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
}

/// Running service captured in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub status: String,
    pub version: String,
}

/// Installed driver captured in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverInfo {
    pub name: String,
    pub version: String,
}

/// Point-in-time capture of an environment's configuration state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub environment_id: String,
    pub captured_at: String,
    pub captured_by: String,
    pub os_version: String,
    pub kernel_version: String,
    pub packages: Vec<PackageInfo>,
    pub services: Vec<ServiceInfo>,
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
    #[serde(default)]
    pub drivers: Vec<DriverInfo>,
    pub disk_image_hash: String,
    pub total_components: u32,
    pub verified: bool,
    /// Set when the capture was fabricated instead of taken from a live host
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub simulated: bool,
}
