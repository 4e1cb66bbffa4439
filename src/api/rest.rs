//! REST adapter for the Environment API
//!
//! Translates store intents into authenticated HTTP calls. Every request
//! carries a bearer token from the identity provider; auth failures
//! propagate unchanged. Idempotent GETs get a bounded retry, mutating
//! POSTs are never retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::sleep;

use super::{AuditQuery, DriftReport, EnvironmentApi, FreezeAction, FreezeResult, SnapshotResult};
use crate::config::VaultConfig;
use crate::error::VaultError;
use crate::identity::IdentityProvider;
use crate::types::{AuditLogEntry, Environment};

#[derive(Debug, Deserialize)]
struct EnvironmentsEnvelope {
    environments: Vec<Environment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuditLogEnvelope {
    audit_log: Vec<AuditLogEntry>,
}

#[derive(Debug, Serialize)]
struct FreezeRequest<'a> {
    action: &'a str,
    actor: &'a str,
}

/// Environment API client
pub struct RestClient {
    config: VaultConfig,
    identity: Arc<dyn IdentityProvider>,
    http: reqwest::Client,
}

impl RestClient {
    pub fn new(
        config: VaultConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, VaultError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| VaultError::Network(e.to_string()))?;

        Ok(Self {
            config,
            identity,
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_endpoint.trim_end_matches('/'), path)
    }

    /// `Authorization` header value from the identity provider.
    /// An auth failure here is returned to the caller as-is.
    async fn auth_header(&self) -> Result<String, VaultError> {
        let session = self.identity.current_session().await?;
        Ok(session.bearer())
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, VaultError> {
        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| VaultError::Parse(e.to_string()))
        } else {
            let message = response.text().await.unwrap_or_default();
            log::error!("Environment API returned {}: {}", status, message);
            Err(VaultError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// One GET, no retry.
    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, VaultError> {
        let auth = self.auth_header().await?;

        let response = self
            .http
            .get(url)
            .header("Authorization", auth)
            .query(query)
            .send()
            .await
            .map_err(|e| VaultError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    /// GET with bounded retry on transient failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, VaultError> {
        let mut attempt = 0;
        loop {
            match self.get_once(url, query).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.config.read_retry_attempts => {
                    attempt += 1;
                    log::warn!(
                        "GET {} failed ({}), retry {}/{}",
                        url,
                        err,
                        attempt,
                        self.config.read_retry_attempts
                    );
                    sleep(Duration::from_millis(self.config.read_retry_delay_ms)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T, VaultError> {
        let auth = self.auth_header().await?;

        let response = self
            .http
            .post(url)
            .header("Authorization", auth)
            .json(&body)
            .send()
            .await
            .map_err(|e| VaultError::Network(e.to_string()))?;

        Self::decode(response).await
    }
}

#[async_trait]
impl EnvironmentApi for RestClient {
    async fn list_environments(&self) -> Result<Vec<Environment>, VaultError> {
        let envelope: EnvironmentsEnvelope =
            self.get_json(&self.url("/environments"), &[]).await?;
        Ok(envelope.environments)
    }

    async fn capture_snapshot(&self, environment_id: &str) -> Result<SnapshotResult, VaultError> {
        let url = self.url(&format!("/environments/{}/snapshot", environment_id));
        self.post_json(&url, json!({})).await
    }

    async fn check_drift(&self, environment_id: &str) -> Result<DriftReport, VaultError> {
        let url = self.url(&format!("/environments/{}/drift", environment_id));
        self.get_json(&url, &[]).await
    }

    async fn set_freeze(
        &self,
        environment_id: &str,
        action: FreezeAction,
        actor: &str,
    ) -> Result<FreezeResult, VaultError> {
        let url = self.url(&format!("/environments/{}/freeze", environment_id));
        let body = serde_json::to_value(FreezeRequest {
            action: action.as_str(),
            actor,
        })
        .map_err(|e| VaultError::Parse(e.to_string()))?;

        self.post_json(&url, body).await
    }

    async fn fetch_audit_log(&self, query: &AuditQuery) -> Result<Vec<AuditLogEntry>, VaultError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(ref environment_id) = query.environment_id {
            params.push(("environmentId", environment_id.clone()));
        }
        params.push(("limit", query.limit.to_string()));

        let envelope: AuditLogEnvelope = self.get_json(&self.url("/audit-log"), &params).await?;
        Ok(envelope.audit_log)
    }
}
