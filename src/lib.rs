//! Research Environment Vault - Core State Service
//!
//! In-memory, observable application state for the vault dashboard: the
//! environment registry, drift events and audit trail, synchronized
//! against the remote Environment API and degrading to a bundled
//! simulation dataset when the remote is unreachable.
//!
//! The two external collaborators sit behind traits: an
//! [`identity::IdentityProvider`] supplies bearer tokens, and an
//! [`api::EnvironmentApi`] carries the five REST operations. UI layers
//! construct a [`store::VaultStore`] with those handles and subscribe to
//! its state; there are no ambient globals.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod mock;
pub mod store;
pub mod types;

pub use api::{
    AuditQuery, DriftReport, EnvironmentApi, FreezeAction, FreezeResult, RestClient,
    SnapshotResult,
};
pub use config::VaultConfig;
pub use error::VaultError;
pub use identity::{IdentityProvider, LocalDirectory, SessionToken, StaticSession};
pub use store::{Action, ActiveTab, LoadOutcome, VaultState, VaultStore};
pub use types::{
    AuditAction, AuditLogEntry, DriftEvent, DriftSeverity, EnvStatus, Environment,
    EnvironmentPatch, LogSeverity, Researcher, Snapshot,
};
