use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::material::parse_pem_key;
use crate::domain::{AuthError, KeyId, KeyProvider, ResolvedKey};

const PROVIDER_NAME: &str = "vault";

/// Where a key lives inside Vault's KV v2 engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VaultKeyMapping {
    pub path: String,
    /// Secret field holding the PEM text
    #[serde(default = "default_field")]
    pub field: String,
}

fn default_field() -> String {
    "private_key".to_string()
}

impl VaultKeyMapping {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            field: default_field(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

/// Vault client configuration
#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub address: String,
    pub token: String,
    pub mount_path: String,
    pub timeout: Duration,
}

impl VaultConfig {
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            mount_path: "secret".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_mount_path(mut self, mount_path: impl Into<String>) -> Self {
        self.mount_path = mount_path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Trait for Vault client operations (for mocking)
#[async_trait]
pub trait VaultClient: Send + Sync + std::fmt::Debug {
    async fn read_secret(&self, path: &str) -> Result<HashMap<String, String>, AuthError>;
}

/// Vault HTTP client for the KV v2 secrets engine
#[derive(Debug)]
pub struct HttpVaultClient {
    config: VaultConfig,
    http_client: reqwest::Client,
}

impl HttpVaultClient {
    pub fn new(config: VaultConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                AuthError::configuration(format!("Failed to build Vault HTTP client: {}", e))
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[derive(Deserialize)]
struct VaultResponse {
    data: VaultData,
}

#[derive(Deserialize)]
struct VaultData {
    data: HashMap<String, serde_json::Value>,
}

#[async_trait]
impl VaultClient for HttpVaultClient {
    async fn read_secret(&self, path: &str) -> Result<HashMap<String, String>, AuthError> {
        let url = format!(
            "{}/v1/{}/data/{}",
            self.config.address.trim_end_matches('/'),
            self.config.mount_path,
            path
        );

        let response = self
            .http_client
            .get(&url)
            .header("X-Vault-Token", &self.config.token)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    AuthError::source_unavailable(format!("Vault unreachable at {}", url))
                        .with_source(e)
                } else {
                    AuthError::backend(PROVIDER_NAME, format!("Vault request failed: {}", e))
                        .with_source(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AuthError::source_unavailable(format!(
                "Vault secret '{}' not found",
                path
            )));
        }

        if !status.is_success() {
            return Err(AuthError::backend(
                PROVIDER_NAME,
                format!("Vault returned error status: {}", status),
            ));
        }

        let vault_response: VaultResponse = response.json().await.map_err(|e| {
            AuthError::backend(PROVIDER_NAME, format!("Failed to parse Vault response: {}", e))
                .with_source(e)
        })?;

        let data = vault_response
            .data
            .data
            .into_iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
            .collect();

        Ok(data)
    }
}

/// Key provider that reads PEM key material from HashiCorp Vault
#[derive(Debug)]
pub struct VaultKeyProvider<C: VaultClient> {
    client: C,
    mappings: HashMap<String, VaultKeyMapping>,
}

impl VaultKeyProvider<HttpVaultClient> {
    pub fn new(config: VaultConfig) -> Result<Self, AuthError> {
        Ok(Self::with_client(HttpVaultClient::new(config)?))
    }
}

impl<C: VaultClient> VaultKeyProvider<C> {
    pub fn with_client(client: C) -> Self {
        Self {
            client,
            mappings: HashMap::new(),
        }
    }

    pub fn with_mapping(mut self, key_id: impl Into<String>, mapping: VaultKeyMapping) -> Self {
        self.mappings.insert(key_id.into(), mapping);
        self
    }

    pub fn with_mappings(mut self, mappings: HashMap<String, VaultKeyMapping>) -> Self {
        self.mappings.extend(mappings);
        self
    }
}

#[async_trait]
impl<C: VaultClient> KeyProvider for VaultKeyProvider<C> {
    async fn resolve(&self, key_id: &KeyId) -> Result<ResolvedKey, AuthError> {
        let mapping = self
            .mappings
            .get(key_id.as_str())
            .ok_or_else(|| AuthError::identifier_not_found(key_id.as_str()))?;

        tracing::debug!(
            provider = PROVIDER_NAME,
            key_id = %key_id,
            path = %mapping.path,
            "Reading key from Vault"
        );

        let secret_data = self.client.read_secret(&mapping.path).await?;

        let pem = secret_data.get(&mapping.field).ok_or_else(|| {
            AuthError::material_invalid(format!(
                "Field '{}' not found in Vault secret '{}'",
                mapping.field, mapping.path
            ))
        })?;

        parse_pem_key(key_id, pem)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
