//! Secret retrieval.
//!
//! Every backend fails with a configuration error when the secret is missing
//! or its payload is empty.

use crate::config::{GcpConfig, env_or};
use crate::error::{AgentError, transport_error, truncate_error};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use std::collections::HashMap;
use std::sync::Arc;

const SECRET_MANAGER_BASE: &str = "https://secretmanager.googleapis.com/v1";

#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, id: &str) -> Result<String, AgentError>;
}

fn missing(id: &str) -> AgentError {
    AgentError::config(format!("secret '{}' is empty or missing", id))
}

/// Environment variable holding secret `id`: `youtube-api-key` -> `YOUTUBE_API_KEY`.
pub fn env_key_for(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Reads secrets from the process environment.
pub struct EnvSecretStore;

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_secret(&self, id: &str) -> Result<String, AgentError> {
        std::env::var(env_key_for(id))
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| missing(id))
    }
}

/// A fixed set of secrets, for local runs and tests.
#[derive(Default)]
pub struct StaticSecretStore {
    secrets: HashMap<String, String>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, value: &str) -> Self {
        self.secrets.insert(id.to_string(), value.to_string());
        self
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn get_secret(&self, id: &str) -> Result<String, AgentError> {
        self.secrets
            .get(id)
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .ok_or_else(|| missing(id))
    }
}

/// Google Secret Manager over REST, always reading the latest version.
pub struct GcpSecretStore {
    http: reqwest::Client,
    project: String,
    access_token: Option<String>,
}

impl GcpSecretStore {
    pub fn new(http: reqwest::Client, config: &GcpConfig) -> Self {
        Self {
            http,
            project: config.project.clone(),
            access_token: config.access_token.clone(),
        }
    }

    fn access_url(&self, id: &str) -> String {
        format!(
            "{}/projects/{}/secrets/{}/versions/latest:access",
            SECRET_MANAGER_BASE, self.project, id
        )
    }
}

#[derive(serde::Deserialize)]
struct AccessSecretResponse {
    payload: Option<SecretPayload>,
}

#[derive(serde::Deserialize)]
struct SecretPayload {
    data: Option<String>,
}

/// Decode the base64 payload of an `access` response.
fn decode_payload(id: &str, body: &str) -> Result<String, AgentError> {
    let parsed: AccessSecretResponse =
        serde_json::from_str(body).map_err(|e| AgentError::decode("secret", e.to_string()))?;
    let data = parsed
        .payload
        .and_then(|p| p.data)
        .ok_or_else(|| missing(id))?;
    let bytes = BASE64
        .decode(data.trim())
        .map_err(|e| AgentError::decode("secret", format!("payload is not base64: {}", e)))?;
    let value = String::from_utf8(bytes)
        .map_err(|_| AgentError::decode("secret", "payload is not valid UTF-8"))?;
    if value.trim().is_empty() {
        return Err(missing(id));
    }
    Ok(value)
}

#[async_trait]
impl SecretStore for GcpSecretStore {
    async fn get_secret(&self, id: &str) -> Result<String, AgentError> {
        let mut request = self.http.get(self.access_url(id));
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| transport_error("secret", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error("secret", e))?;

        if status.as_u16() == 404 {
            return Err(missing(id));
        }
        if !status.is_success() {
            return Err(AgentError::upstream_status(
                "secret",
                status.as_u16(),
                truncate_error(&body),
            ));
        }
        decode_payload(id, &body)
    }
}

/// Pick the secret backend named by `SECRET_BACKEND` (`env` or `gcp`).
pub fn secret_store_from_env(http: reqwest::Client, config: &GcpConfig) -> Arc<dyn SecretStore> {
    match env_or("SECRET_BACKEND", "env").as_str() {
        "gcp" => {
            log::info!("Using Secret Manager for project {}", config.project);
            Arc::new(GcpSecretStore::new(http, config))
        }
        other => {
            if other != "env" {
                log::warn!("Unknown SECRET_BACKEND '{}', reading secrets from environment", other);
            }
            Arc::new(EnvSecretStore)
        }
    }
}
