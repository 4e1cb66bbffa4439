//! Bundled simulation dataset
//!
//! The store boots with this data and falls back to it whenever the
//! Environment API is unreachable, so the dashboard stays demoable
//! offline. The records mirror the seed data the backend initializes
//! itself with.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::types::{
    vault_timestamp, AuditAction, AuditLogEntry, DriftEvent, DriftSeverity, DriverInfo,
    EnvStatus, Environment, LogSeverity, PackageInfo, Researcher, ServiceInfo, Snapshot,
};

fn environment(
    id: &str,
    lab_name: &str,
    facility: &str,
    researcher_name: &str,
    researcher_role: &str,
    experiment_id: &str,
    experiment_name: &str,
    status: EnvStatus,
    drift_score: Option<u32>,
    last_snapshot_at: Option<&str>,
    created_at: &str,
    constraints: &[&str],
    stack_name: &str,
    stack_status: &str,
    workspace_id: Option<&str>,
) -> Environment {
    Environment {
        id: id.to_string(),
        lab_name: lab_name.to_string(),
        facility: facility.to_string(),
        researcher: Researcher {
            name: researcher_name.to_string(),
            role: researcher_role.to_string(),
        },
        experiment_id: experiment_id.to_string(),
        experiment_name: experiment_name.to_string(),
        status,
        drift_score,
        last_snapshot_at: last_snapshot_at.map(str::to_string),
        created_at: created_at.to_string(),
        constraints: constraints.iter().map(|c| c.to_string()).collect(),
        cloudformation_stack_name: stack_name.to_string(),
        cloudformation_stack_status: stack_status.to_string(),
        workspace_id: workspace_id.map(str::to_string),
    }
}

/// The six bundled environments
pub static MOCK_ENVIRONMENTS: Lazy<Vec<Environment>> = Lazy::new(|| {
    vec![
        environment(
            "env-mariposa-07",
            "Lab Mariposa 07",
            "West Tek Headquarters",
            "Dr. J. Whitmore",
            "Senior Researcher",
            "FEV-2077-ALPHA",
            "Forced Evolutionary Virus Batch 11-111",
            EnvStatus::Frozen,
            Some(0),
            Some("2077.10.23 14:32:01"),
            "2077.08.15 09:00:00",
            &[
                "DO NOT update Python beyond 3.8.12",
                "CUDA driver must remain at 11.4",
                "FEV analyzer package is proprietary - no modifications",
            ],
            "mariposa-07-stack",
            "UPDATE_COMPLETE",
            Some("ws-mariposa07"),
        ),
        environment(
            "env-westtek-12",
            "Lab West Tek 12",
            "West Tek Headquarters",
            "Dr. A. Petrov",
            "Bio-Enhancement Lead",
            "BIO-2078-SERIES9",
            "Bio-Enhancement Serum Series 9",
            EnvStatus::Active,
            Some(23),
            Some("2077.10.20 09:30:00"),
            "2077.09.01 10:15:00",
            &[
                "Serum synthesis requires exact temperature control",
                "NumPy version locked for reproducibility",
            ],
            "westtek-12-stack",
            "UPDATE_COMPLETE",
            None,
        ),
        environment(
            "env-appalachia-03",
            "Lab Appalachia 03",
            "Appalachia Research Facility",
            "Dr. M. Chen",
            "Chemical Engineer",
            "CHM-2079-RESIST",
            "Chemical Resistance Protocol",
            EnvStatus::Staging,
            None,
            None,
            "2077.10.22 16:00:00",
            &[],
            "appalachia-03-stack",
            "CREATE_IN_PROGRESS",
            None,
        ),
        environment(
            "env-mariposa-12",
            "Lab Mariposa 12",
            "West Tek Headquarters",
            "Dr. R. Grey",
            "Principal Investigator",
            "FEV-2076-7ALPHA",
            "FEV Batch 7-Alpha (Discontinued)",
            EnvStatus::Archived,
            Some(0),
            Some("2077.03.15 11:20:00"),
            "2076.11.10 08:00:00",
            &[],
            "mariposa-12-stack",
            "DELETE_COMPLETE",
            None,
        ),
        environment(
            "env-westtek-05",
            "Lab West Tek 05",
            "West Tek Headquarters",
            "Dr. K. Okoye",
            "Nanotech Specialist",
            "NANO-2077-NNI2",
            "Nanotech Neural Interface v2",
            EnvStatus::Frozen,
            Some(0),
            Some("2077.10.18 13:45:00"),
            "2077.07.20 14:30:00",
            &[
                "Neural interface drivers are version-locked",
                "TensorFlow 2.8.0 required - do not upgrade",
            ],
            "westtek-05-stack",
            "UPDATE_COMPLETE",
            None,
        ),
        environment(
            "env-gnr-01",
            "Lab GNR 01",
            "Galaxy News Radio Research Wing",
            "Dr. H. Tanaka",
            "Atmospheric Scientist",
            "ATM-2077-RAD",
            "Atmospheric Radiation Analysis",
            EnvStatus::Active,
            Some(8),
            Some("2077.10.22 14:00:00"),
            "2077.09.10 11:00:00",
            &[],
            "gnr-01-stack",
            "UPDATE_COMPLETE",
            None,
        ),
    ]
});

/// Unresolved drift events bundled with the dataset
pub static MOCK_DRIFT_EVENTS: Lazy<Vec<DriftEvent>> = Lazy::new(|| {
    vec![
        DriftEvent {
            id: "drift-wtk12-001".to_string(),
            environment_id: "env-westtek-12".to_string(),
            detected_at: "2077.10.23 02:15:00".to_string(),
            severity: DriftSeverity::Warning,
            parameter: "python3.numpy.version".to_string(),
            expected_value: "1.21.0".to_string(),
            actual_value: "1.22.3".to_string(),
            category: "package".to_string(),
            resolved: false,
        },
        DriftEvent {
            id: "drift-wtk12-002".to_string(),
            environment_id: "env-westtek-12".to_string(),
            detected_at: "2077.10.23 02:15:00".to_string(),
            severity: DriftSeverity::Warning,
            parameter: "python3.version".to_string(),
            expected_value: "3.8.12".to_string(),
            actual_value: "3.8.15".to_string(),
            category: "package".to_string(),
            resolved: false,
        },
        DriftEvent {
            id: "drift-gnr01-001".to_string(),
            environment_id: "env-gnr-01".to_string(),
            detected_at: "2077.10.22 18:30:00".to_string(),
            severity: DriftSeverity::Info,
            parameter: "sshd.config".to_string(),
            expected_value: "PermitRootLogin no".to_string(),
            actual_value: "PermitRootLogin yes".to_string(),
            category: "config".to_string(),
            resolved: false,
        },
    ]
});

/// Audit trail bundled with the dataset (most-recent-first)
pub static MOCK_AUDIT_LOG: Lazy<Vec<AuditLogEntry>> = Lazy::new(|| {
    vec![
        AuditLogEntry {
            id: "log-001".to_string(),
            timestamp: "2077.10.23 14:32:01".to_string(),
            actor: "Dr. J. Whitmore".to_string(),
            environment_id: Some("env-mariposa-07".to_string()),
            action: AuditAction::SnapshotCaptured,
            details: "Snapshot snap-mar07-001 captured. 142 components verified.".to_string(),
            severity: LogSeverity::Info,
        },
        AuditLogEntry {
            id: "log-002".to_string(),
            timestamp: "2077.10.23 02:15:00".to_string(),
            actor: "SYSTEM".to_string(),
            environment_id: Some("env-westtek-12".to_string()),
            action: AuditAction::DriftDetected,
            details: "Drift detected: 2 package version changes (WARNING severity)".to_string(),
            severity: LogSeverity::Warning,
        },
        AuditLogEntry {
            id: "log-003".to_string(),
            timestamp: "2077.10.22 16:00:00".to_string(),
            actor: "Dr. M. Chen".to_string(),
            environment_id: Some("env-appalachia-03".to_string()),
            action: AuditAction::StateChanged,
            details: "Environment created with status STAGING".to_string(),
            severity: LogSeverity::Info,
        },
        AuditLogEntry {
            id: "log-004".to_string(),
            timestamp: "2077.10.22 14:00:00".to_string(),
            actor: "SYSTEM".to_string(),
            environment_id: Some("env-gnr-01".to_string()),
            action: AuditAction::SnapshotCaptured,
            details: "Scheduled snapshot completed. All systems nominal.".to_string(),
            severity: LogSeverity::Info,
        },
        AuditLogEntry {
            id: "log-005".to_string(),
            timestamp: "2077.10.20 09:30:00".to_string(),
            actor: "Dr. A. Petrov".to_string(),
            environment_id: Some("env-westtek-12".to_string()),
            action: AuditAction::SnapshotCaptured,
            details: "Baseline snapshot for Bio-Enhancement Series 9".to_string(),
            severity: LogSeverity::Info,
        },
    ]
});

/// Historical snapshots keyed by environment id
pub static MOCK_SNAPSHOTS: Lazy<HashMap<String, Vec<Snapshot>>> = Lazy::new(|| {
    let mut map = HashMap::new();

    map.insert(
        "env-mariposa-07".to_string(),
        vec![Snapshot {
            id: "snap-mar07-001".to_string(),
            environment_id: "env-mariposa-07".to_string(),
            captured_at: "2077.10.23 14:32:01".to_string(),
            captured_by: "Dr. J. Whitmore".to_string(),
            os_version: "Ubuntu 20.04.5 LTS".to_string(),
            kernel_version: "5.15.0-56-generic".to_string(),
            packages: packages(&[
                ("python3", "3.8.12"),
                ("numpy", "1.21.0"),
                ("scipy", "1.7.3"),
                ("pandas", "1.3.5"),
                ("wtek-datalogger", "2.1.0"),
                ("fev-analyzer", "4.7.2"),
            ]),
            services: vec![
                service("sshd", "active", "8.2p1"),
                service("docker", "active", "20.10.21"),
            ],
            environment_variables: env_vars(&[
                ("FEV_DATA_PATH", "/vault/data/fev"),
                ("CUDA_VISIBLE_DEVICES", "0,1"),
            ]),
            drivers: vec![
                driver("NVIDIA Driver", "470.161.03"),
                driver("CUDA", "11.4"),
            ],
            disk_image_hash: "7f3a9b2c1e4d5f6a8b9c0d1e2f3a4b5c".to_string(),
            total_components: 142,
            verified: true,
            simulated: false,
        }],
    );

    map.insert(
        "env-westtek-12".to_string(),
        vec![Snapshot {
            id: "snap-wtk12-001".to_string(),
            environment_id: "env-westtek-12".to_string(),
            captured_at: "2077.10.20 09:30:00".to_string(),
            captured_by: "Dr. A. Petrov".to_string(),
            os_version: "Ubuntu 20.04.5 LTS".to_string(),
            kernel_version: "5.15.0-56-generic".to_string(),
            packages: packages(&[
                ("python3", "3.8.12"),
                ("numpy", "1.21.0"),
                ("scipy", "1.7.3"),
            ]),
            services: vec![service("sshd", "active", "8.2p1")],
            environment_variables: HashMap::new(),
            drivers: vec![],
            disk_image_hash: "a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6".to_string(),
            total_components: 98,
            verified: true,
            simulated: false,
        }],
    );

    map
});

/// Fabricate a plausible snapshot for an environment with no live host,
/// the same way the backend simulates one when no instance is reachable.
pub fn simulated_snapshot(env: &Environment) -> Snapshot {
    let captured_at = vault_timestamp();

    Snapshot {
        id: format!("snap-{}-{}", env.id, chrono::Utc::now().timestamp()),
        environment_id: env.id.clone(),
        captured_at,
        captured_by: env.researcher.name.clone(),
        os_version: "Ubuntu 20.04.5 LTS".to_string(),
        kernel_version: "5.15.0-56-generic".to_string(),
        packages: packages(&[
            ("python3", "3.8.12"),
            ("numpy", "1.21.0"),
            ("scipy", "1.7.3"),
            ("pandas", "1.3.5"),
        ]),
        services: vec![
            service("sshd", "active", "8.2p1"),
            service("docker", "active", "20.10.21"),
        ],
        environment_variables: env_vars(&[
            ("FEV_DATA_PATH", "/vault/data/fev"),
            ("CUDA_VISIBLE_DEVICES", "0,1"),
        ]),
        drivers: vec![
            driver("NVIDIA Driver", "470.161.03"),
            driver("CUDA", "11.4"),
        ],
        disk_image_hash: "7f3a9b2c1e4d5f6a8b9c0d1e2f3a4b5c".to_string(),
        total_components: 142,
        verified: true,
        simulated: true,
    }
}

fn packages(list: &[(&str, &str)]) -> Vec<PackageInfo> {
    list.iter()
        .map(|(name, version)| PackageInfo {
            name: name.to_string(),
            version: version.to_string(),
        })
        .collect()
}

fn service(name: &str, status: &str, version: &str) -> ServiceInfo {
    ServiceInfo {
        name: name.to_string(),
        status: status.to_string(),
        version: version.to_string(),
    }
}

fn driver(name: &str, version: &str) -> DriverInfo {
    DriverInfo {
        name: name.to_string(),
        version: version.to_string(),
    }
}

fn env_vars(list: &[(&str, &str)]) -> HashMap<String, String> {
    list.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_shape() {
        assert_eq!(MOCK_ENVIRONMENTS.len(), 6);
        assert_eq!(MOCK_DRIFT_EVENTS.len(), 3);
        assert_eq!(MOCK_AUDIT_LOG.len(), 5);
        assert_eq!(MOCK_SNAPSHOTS.len(), 2);
    }

    #[test]
    fn test_unmeasured_environment_has_no_score() {
        let staging = MOCK_ENVIRONMENTS
            .iter()
            .find(|e| e.id == "env-appalachia-03")
            .unwrap();

        // No snapshot yet, so no drift score either
        assert_eq!(staging.status, EnvStatus::Staging);
        assert!(staging.drift_score.is_none());
        assert!(staging.last_snapshot_at.is_none());
    }

    #[test]
    fn test_audit_log_is_most_recent_first() {
        let timestamps: Vec<&str> = MOCK_AUDIT_LOG.iter().map(|e| e.timestamp.as_str()).collect();
        let mut sorted = timestamps.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(timestamps, sorted);
    }

    #[test]
    fn test_simulated_snapshot_is_flagged() {
        let env = &MOCK_ENVIRONMENTS[2];
        let snap = simulated_snapshot(env);

        assert!(snap.simulated);
        assert_eq!(snap.environment_id, env.id);
        assert_eq!(snap.captured_by, env.researcher.name);
    }
}
