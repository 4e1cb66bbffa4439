//! Vault state and pure transitions
//!
//! Every store mutation is expressed as `reduce(state, action) -> state`:
//! a whole new state derived from the old one, so observers never see a
//! half-applied update. The transitions here do no I/O and are unit
//! tested directly.

use serde::{Deserialize, Serialize};

use crate::mock::{MOCK_AUDIT_LOG, MOCK_DRIFT_EVENTS, MOCK_ENVIRONMENTS};
use crate::types::{AuditLogEntry, DriftEvent, Environment, EnvironmentPatch};

/// Dashboard tab currently in view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveTab {
    #[serde(rename = "ENVIRONMENTS")]
    Environments,
    #[serde(rename = "DRIFT MONITOR")]
    DriftMonitor,
    #[serde(rename = "ONBOARDING")]
    Onboarding,
    #[serde(rename = "VAULT LOG")]
    VaultLog,
}

/// Aggregate application state held by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultState {
    pub environments: Vec<Environment>,
    /// Most-recent-first
    pub audit_log: Vec<AuditLogEntry>,
    pub drift_events: Vec<DriftEvent>,
    pub active_tab: ActiveTab,
    pub boot_complete: bool,
    /// Degraded mode: the store is serving bundled mock data
    pub simulation_mode: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl VaultState {
    /// Boot state: bundled mock data, simulation mode on.
    pub fn initial() -> Self {
        Self {
            environments: MOCK_ENVIRONMENTS.clone(),
            audit_log: MOCK_AUDIT_LOG.clone(),
            drift_events: MOCK_DRIFT_EVENTS.clone(),
            active_tab: ActiveTab::Environments,
            boot_complete: false,
            simulation_mode: true,
            loading: false,
            error: None,
        }
    }

    pub fn environment(&self, id: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.id == id)
    }
}

/// Tagged union of every state transition.
#[derive(Debug, Clone)]
pub enum Action {
    SetBootComplete,
    SetActiveTab(ActiveTab),
    SetLoading(bool),
    SetError(Option<String>),
    SetSimulationMode(bool),
    /// Wholesale replacement from a successful remote load; also clears
    /// simulation mode, since the remote is evidently reachable
    SetEnvironments(Vec<Environment>),
    AddLogEntry(AuditLogEntry),
    SetAuditLog(Vec<AuditLogEntry>),
    UpdateEnvironment {
        id: String,
        patch: EnvironmentPatch,
    },
    AddDriftEvent(DriftEvent),
    SetDriftEvents(Vec<DriftEvent>),
}

/// Pure transition function.
pub fn reduce(state: &VaultState, action: &Action) -> VaultState {
    let mut next = state.clone();

    match action {
        Action::SetBootComplete => {
            next.boot_complete = true;
        }
        Action::SetActiveTab(tab) => {
            next.active_tab = *tab;
        }
        Action::SetLoading(loading) => {
            next.loading = *loading;
        }
        Action::SetError(error) => {
            next.error = error.clone();
        }
        Action::SetSimulationMode(on) => {
            next.simulation_mode = *on;
        }
        Action::SetEnvironments(environments) => {
            next.environments = environments.clone();
            next.simulation_mode = false;
        }
        Action::AddLogEntry(entry) => {
            next.audit_log.insert(0, entry.clone());
        }
        Action::SetAuditLog(entries) => {
            next.audit_log = entries.clone();
        }
        Action::UpdateEnvironment { id, patch } => {
            // Unknown id is a no-op
            if let Some(env) = next.environments.iter_mut().find(|e| &e.id == id) {
                patch.apply_to(env);
            }
        }
        Action::AddDriftEvent(event) => {
            next.drift_events.push(event.clone());
        }
        Action::SetDriftEvents(events) => {
            next.drift_events = events.clone();
        }
    }

    next
}
