use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{
    AwsKmsKeyProvider, AzureKeyVaultConfig, AzureKeyVaultKeyProvider, CachedKeyProvider,
    LocalKeyProvider, VaultConfig, VaultKeyMapping, VaultKeyProvider,
};
use crate::config::{AppConfig, CacheConfig, JwtOptions};
use crate::domain::{AuthError, KeyId, KeyProvider, ResolvedKey};

/// Provider type configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// PEM files listed in `jwt.key_paths`
    #[default]
    Local,
    AwsKms {
        region: Option<String>,
    },
    AzureKeyVault {
        vault_url: String,
        access_token: String,
        #[serde(default = "default_api_version")]
        api_version: String,
        #[serde(default = "default_timeout_seconds")]
        timeout_seconds: u64,
    },
    Vault {
        address: String,
        token: String,
        #[serde(default = "default_mount_path")]
        mount_path: String,
        #[serde(default = "default_timeout_seconds")]
        timeout_seconds: u64,
        #[serde(default)]
        keys: HashMap<String, VaultKeyMapping>,
    },
}

fn default_mount_path() -> String {
    "secret".to_string()
}

fn default_api_version() -> String {
    "7.4".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

/// Factory for creating key providers
#[derive(Debug)]
pub struct KeyProviderFactory;

impl KeyProviderFactory {
    /// Create a key provider from configuration
    pub async fn create(
        config: &ProviderConfig,
        options: &JwtOptions,
    ) -> Result<Arc<dyn KeyProvider>, AuthError> {
        match config {
            ProviderConfig::Local => Ok(Arc::new(LocalKeyProvider::from_options(options))),

            ProviderConfig::AwsKms { region } => {
                let provider = AwsKmsKeyProvider::new(region.clone()).await;
                Ok(Arc::new(provider))
            }

            ProviderConfig::AzureKeyVault {
                vault_url,
                access_token,
                api_version,
                timeout_seconds,
            } => {
                let azure_config = AzureKeyVaultConfig::new(vault_url, access_token)
                    .with_api_version(api_version)
                    .with_timeout(Duration::from_secs(*timeout_seconds));
                Ok(Arc::new(AzureKeyVaultKeyProvider::new(azure_config)?))
            }

            ProviderConfig::Vault {
                address,
                token,
                mount_path,
                timeout_seconds,
                keys,
            } => {
                let vault_config = VaultConfig::new(address, token)
                    .with_mount_path(mount_path)
                    .with_timeout(Duration::from_secs(*timeout_seconds));
                let provider = VaultKeyProvider::new(vault_config)?.with_mappings(keys.clone());
                Ok(Arc::new(provider))
            }
        }
    }

    /// Create a key provider wrapped in a TTL cache
    pub async fn create_cached(
        config: &ProviderConfig,
        options: &JwtOptions,
        cache: &CacheConfig,
    ) -> Result<Arc<dyn KeyProvider>, AuthError> {
        let inner = Self::create(config, options).await?;

        let cached = CachedKeyProvider::with_capacity(
            ArcProvider(inner),
            Duration::from_secs(cache.ttl_seconds),
            cache.max_capacity,
        );
        Ok(Arc::new(cached))
    }

    /// Create the provider described by the application configuration
    pub async fn from_app_config(config: &AppConfig) -> Result<Arc<dyn KeyProvider>, AuthError> {
        if config.cache.enabled {
            Self::create_cached(&config.key_provider, &config.jwt, &config.cache).await
        } else {
            Self::create(&config.key_provider, &config.jwt).await
        }
    }
}

/// Wrapper to make Arc<dyn KeyProvider> implement KeyProvider
#[derive(Debug)]
struct ArcProvider(Arc<dyn KeyProvider>);

#[async_trait::async_trait]
impl KeyProvider for ArcProvider {
    async fn resolve(&self, key_id: &KeyId) -> Result<ResolvedKey, AuthError> {
        self.0.resolve(key_id).await
    }

    async fn refresh(&self, key_id: &KeyId) -> Result<ResolvedKey, AuthError> {
        self.0.refresh(key_id).await
    }

    fn provider_name(&self) -> &'static str {
        self.0.provider_name()
    }
}
