//! Vault Console - demo entry point
//!
//! Boots the store against the configured Environment API and prints the
//! resulting state. Without a reachable API (or with no token set) the
//! store serves the bundled simulation dataset, so the console always
//! has something to show.

use std::sync::Arc;

use envvault_core::{
    constants, RestClient, StaticSession, VaultConfig, VaultError, VaultStore,
};

#[tokio::main]
async fn main() -> Result<(), VaultError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!(
        "Starting {} console v{}...",
        constants::APP_NAME,
        constants::APP_VERSION
    );

    let config = VaultConfig::default();
    log::info!("  Environment API: {}", config.api_endpoint);
    log::info!("  Actor: {}", config.default_actor);

    let token = std::env::var("VAULT_API_TOKEN").unwrap_or_default();
    if token.is_empty() {
        log::warn!("VAULT_API_TOKEN not set; remote calls will fail auth and the store will degrade");
    }

    let identity = Arc::new(StaticSession::new(token));
    let client = RestClient::new(config.clone(), identity)?;
    let store = VaultStore::new(client, config.default_actor.clone());

    store.set_boot_complete();

    let outcome = store.load_environments().await;
    store.load_audit_log().await;

    let state = store.state();

    if outcome.is_degraded() {
        log::warn!("Remote vault unreachable - SIMULATION MODE");
    } else {
        log::info!("Connected to remote vault");
    }

    println!();
    println!(
        "=== ENVIRONMENTS ({}){} ===",
        state.environments.len(),
        if state.simulation_mode { " [SIMULATED]" } else { "" }
    );
    for env in &state.environments {
        println!(
            "  {:<20} {:<10} drift={:<4} snapshot={}",
            env.id,
            env.status.as_str(),
            env.drift_score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            env.last_snapshot_at.as_deref().unwrap_or("never"),
        );
    }

    println!();
    println!("=== VAULT LOG (most recent first) ===");
    for entry in state.audit_log.iter().take(10) {
        println!(
            "  {} [{}] {} - {}",
            entry.timestamp,
            entry.action.as_str(),
            entry.actor,
            entry.details
        );
    }

    Ok(())
}
