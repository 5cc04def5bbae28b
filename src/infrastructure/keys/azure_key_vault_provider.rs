use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use reqwest::StatusCode;
use rsa::{BigUint, RsaPublicKey};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::{AuthError, KeyId, KeyProvider, ResolvedKey};

const PROVIDER_NAME: &str = "azure_key_vault";

/// Azure Key Vault client configuration
#[derive(Debug, Clone)]
pub struct AzureKeyVaultConfig {
    /// Vault base URL, e.g. `https://my-vault.vault.azure.net`
    pub vault_url: String,
    /// Bearer token for the `https://vault.azure.net` resource
    pub access_token: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl AzureKeyVaultConfig {
    pub fn new(vault_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            vault_url: vault_url.into(),
            access_token: access_token.into(),
            api_version: "7.4".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Public JWK as returned by Key Vault
#[derive(Debug, Clone, Deserialize)]
pub struct JsonWebKey {
    pub kid: Option<String>,
    pub kty: String,
    pub n: Option<String>,
    pub e: Option<String>,
}

/// Trait for Key Vault client operations (for mocking)
#[async_trait]
pub trait AzureKeyClient: Send + Sync + std::fmt::Debug {
    async fn get_key(&self, name: &str) -> Result<JsonWebKey, AuthError>;
}

/// Key Vault REST client
#[derive(Debug)]
pub struct HttpAzureKeyClient {
    config: AzureKeyVaultConfig,
    http_client: reqwest::Client,
}

impl HttpAzureKeyClient {
    pub fn new(config: AzureKeyVaultConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                AuthError::configuration(format!(
                    "Failed to build Azure Key Vault HTTP client: {}",
                    e
                ))
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[derive(Deserialize)]
struct KeyBundle {
    key: JsonWebKey,
}

#[async_trait]
impl AzureKeyClient for HttpAzureKeyClient {
    async fn get_key(&self, name: &str) -> Result<JsonWebKey, AuthError> {
        let url = format!(
            "{}/keys/{}",
            self.config.vault_url.trim_end_matches('/'),
            name
        );

        let response = self
            .http_client
            .get(&url)
            .query(&[("api-version", self.config.api_version.as_str())])
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    AuthError::source_unavailable(format!("Azure Key Vault unreachable at {}", url))
                        .with_source(e)
                } else {
                    AuthError::backend(
                        PROVIDER_NAME,
                        format!("Azure Key Vault request failed: {}", e),
                    )
                    .with_source(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AuthError::identifier_not_found(name));
        }

        if !status.is_success() {
            return Err(AuthError::backend(
                PROVIDER_NAME,
                format!("Azure Key Vault returned error status: {}", status),
            ));
        }

        let bundle: KeyBundle = response.json().await.map_err(|e| {
            AuthError::backend(
                PROVIDER_NAME,
                format!("Failed to parse Azure Key Vault response: {}", e),
            )
            .with_source(e)
        })?;

        Ok(bundle.key)
    }
}

/// Key provider backed by Azure Key Vault keys
///
/// Key Vault only exposes the public half of a key, so keys from this
/// provider verify tokens but refuse to sign them. The key ID is the key
/// name, optionally followed by `/{version}`.
#[derive(Debug)]
pub struct AzureKeyVaultKeyProvider<C: AzureKeyClient> {
    client: C,
}

impl AzureKeyVaultKeyProvider<HttpAzureKeyClient> {
    pub fn new(config: AzureKeyVaultConfig) -> Result<Self, AuthError> {
        Ok(Self::with_client(HttpAzureKeyClient::new(config)?))
    }
}

impl<C: AzureKeyClient> AzureKeyVaultKeyProvider<C> {
    pub fn with_client(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: AzureKeyClient> KeyProvider for AzureKeyVaultKeyProvider<C> {
    async fn resolve(&self, key_id: &KeyId) -> Result<ResolvedKey, AuthError> {
        tracing::debug!(
            provider = PROVIDER_NAME,
            key_id = %key_id,
            "Fetching public key from Azure Key Vault"
        );

        let jwk = self.client.get_key(key_id.as_str()).await?;
        public_key_from_jwk(key_id, &jwk)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

fn public_key_from_jwk(key_id: &KeyId, jwk: &JsonWebKey) -> Result<ResolvedKey, AuthError> {
    if jwk.kty != "RSA" && jwk.kty != "RSA-HSM" {
        return Err(AuthError::material_invalid(format!(
            "Key '{}' has type {}, expected RSA",
            key_id, jwk.kty
        )));
    }

    let n = jwk_component(key_id, "n", jwk.n.as_deref())?;
    let e = jwk_component(key_id, "e", jwk.e.as_deref())?;

    let public_key = RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
        .map_err(|err| {
            AuthError::material_invalid(format!(
                "Key '{}' is not a usable RSA public key: {}",
                key_id, err
            ))
            .with_source(err)
        })?;

    ResolvedKey::public(key_id.clone(), public_key)
}

fn jwk_component(key_id: &KeyId, name: &str, value: Option<&str>) -> Result<Vec<u8>, AuthError> {
    let value = value.ok_or_else(|| {
        AuthError::material_invalid(format!(
            "Key '{}' is missing JWK component '{}'",
            key_id, name
        ))
    })?;

    URL_SAFE_NO_PAD.decode(value).map_err(|e| {
        AuthError::material_invalid(format!(
            "Key '{}' has malformed JWK component '{}': {}",
            key_id, name, e
        ))
        .with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AuthErrorKind;
    use crate::testutil;
    use rsa::traits::PublicKeyParts;
    use rsa::RsaPrivateKey;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn key_id(id: &str) -> KeyId {
        KeyId::new(id).unwrap()
    }

    fn jwk_body(key: &RsaPrivateKey, kty: &str) -> serde_json::Value {
        let public = key.to_public_key();
        json!({
            "key": {
                "kid": "https://vault.example/keys/token-signing/1",
                "kty": kty,
                "key_ops": ["verify"],
                "n": URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
                "e": URL_SAFE_NO_PAD.encode(public.e().to_bytes_be())
            },
            "attributes": {"enabled": true}
        })
    }

    fn provider_for(server: &MockServer) -> AzureKeyVaultKeyProvider<HttpAzureKeyClient> {
        AzureKeyVaultKeyProvider::new(AzureKeyVaultConfig::new(server.uri(), "access-token"))
            .unwrap()
    }

    #[tokio::test]
    async fn test_azure_provider_returns_public_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/keys/token-signing"))
            .and(query_param("api-version", "7.4"))
            .and(header("Authorization", "Bearer access-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(jwk_body(testutil::signing_key(), "RSA")),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let key = provider.resolve(&key_id("token-signing")).await.unwrap();

        assert_eq!(key.size_bits(), 2048);
        assert!(!key.can_sign());
        assert_eq!(key.public_key(), testutil::signing_key().to_public_key());
        assert_eq!(provider.provider_name(), "azure_key_vault");
    }

    #[tokio::test]
    async fn test_azure_key_cannot_sign() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(jwk_body(testutil::signing_key(), "RSA-HSM")),
            )
            .mount(&server)
            .await;

        let key = provider_for(&server)
            .resolve(&key_id("token-signing/0123abcd"))
            .await
            .unwrap();

        let err = key
            .encoding_key()
            .err()
            .expect("public-only key must not sign");
        assert_eq!(err.kind(), AuthErrorKind::MaterialInvalid);
    }

    #[tokio::test]
    async fn test_azure_provider_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "KeyNotFound", "message": "Key not found: missing"}
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .resolve(&key_id("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::IdentifierNotFound);
    }

    #[tokio::test]
    async fn test_azure_provider_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .resolve(&key_id("token-signing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::BackendError);
    }

    #[tokio::test]
    async fn test_azure_provider_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(jwk_body(testutil::signing_key(), "RSA"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = AzureKeyVaultConfig::new(server.uri(), "access-token")
            .with_timeout(Duration::from_millis(100));
        let provider = AzureKeyVaultKeyProvider::new(config).unwrap();

        let err = provider
            .resolve(&key_id("token-signing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::SourceUnavailable);
    }

    #[tokio::test]
    async fn test_azure_provider_rejects_non_rsa_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "key": {"kty": "EC", "crv": "P-256", "x": "AQAB", "y": "AQAB"}
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .resolve(&key_id("ec-key"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::MaterialInvalid);
        assert!(err.to_string().contains("expected RSA"));
    }

    #[tokio::test]
    async fn test_azure_provider_rejects_weak_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(jwk_body(testutil::weak_key(), "RSA")),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .resolve(&key_id("weak"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::MaterialInvalid);
    }

    #[test]
    fn test_jwk_missing_modulus() {
        let jwk = JsonWebKey {
            kid: None,
            kty: "RSA".to_string(),
            n: None,
            e: Some("AQAB".to_string()),
        };

        let err = public_key_from_jwk(&key_id("partial"), &jwk).unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::MaterialInvalid);
        assert!(err.to_string().contains("'n'"));
    }
}
