use async_trait::async_trait;
use aws_sdk_kms::config::Region;
use aws_sdk_kms::error::{DisplayErrorContext, SdkError};
use aws_sdk_kms::operation::get_public_key::GetPublicKeyError;
use aws_sdk_kms::Client as KmsSdkClient;
#[cfg(test)]
use mockall::automock;

use super::material::parse_public_key_der;
use crate::domain::{AuthError, KeyId, KeyProvider, ResolvedKey};

const PROVIDER_NAME: &str = "aws_kms";

/// Trait for AWS KMS client operations (for mocking)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KmsClient: Send + Sync {
    /// DER-encoded SubjectPublicKeyInfo of the key
    async fn get_public_key(&self, key_id: &str) -> Result<Vec<u8>, AuthError>;
}

/// Real AWS KMS client wrapper
#[derive(Debug, Clone)]
pub struct AwsKmsClient {
    client: KmsSdkClient,
}

impl AwsKmsClient {
    pub fn new(client: KmsSdkClient) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS credential chain
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;

        Self::new(KmsSdkClient::new(&config))
    }
}

fn map_sdk_error<R>(key_id: &str, err: SdkError<GetPublicKeyError, R>) -> AuthError
where
    R: std::fmt::Debug + Send + Sync + 'static,
{
    if err
        .as_service_error()
        .is_some_and(GetPublicKeyError::is_not_found_exception)
    {
        return AuthError::identifier_not_found(key_id);
    }

    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => AuthError::source_unavailable(
            format!("AWS KMS unreachable while fetching key '{}'", key_id),
        )
        .with_source(err),
        _ => AuthError::backend(
            PROVIDER_NAME,
            format!(
                "AWS KMS error for key '{}': {}",
                key_id,
                DisplayErrorContext(&err)
            ),
        )
        .with_source(err),
    }
}

#[async_trait]
impl KmsClient for AwsKmsClient {
    async fn get_public_key(&self, key_id: &str) -> Result<Vec<u8>, AuthError> {
        let response = self
            .client
            .get_public_key()
            .key_id(key_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(key_id, e))?;

        response
            .public_key()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| {
                AuthError::material_invalid(format!(
                    "AWS KMS returned no public key for '{}'",
                    key_id
                ))
            })
    }
}

/// Key provider backed by AWS KMS asymmetric keys
///
/// KMS never releases private key material, so keys from this provider
/// verify tokens but refuse to sign them.
pub struct AwsKmsKeyProvider<C: KmsClient> {
    client: C,
}

impl<C: KmsClient> std::fmt::Debug for AwsKmsKeyProvider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsKmsKeyProvider")
            .field("client", &"[kms]")
            .finish()
    }
}

impl AwsKmsKeyProvider<AwsKmsClient> {
    pub async fn new(region: Option<String>) -> Self {
        Self {
            client: AwsKmsClient::from_env(region).await,
        }
    }
}

impl<C: KmsClient> AwsKmsKeyProvider<C> {
    pub fn with_client(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: KmsClient> KeyProvider for AwsKmsKeyProvider<C> {
    async fn resolve(&self, key_id: &KeyId) -> Result<ResolvedKey, AuthError> {
        tracing::debug!(
            provider = PROVIDER_NAME,
            key_id = %key_id,
            "Fetching public key from AWS KMS"
        );

        let der = self.client.get_public_key(key_id.as_str()).await?;
        parse_public_key_der(key_id, &der)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_kms::types::error::{DisabledException, NotFoundException};
    use crate::domain::AuthErrorKind;
    use crate::testutil;

    fn key_id(id: &str) -> KeyId {
        KeyId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_kms_provider_returns_public_key() {
        let der = testutil::public_der(testutil::signing_key());
        let mut client = MockKmsClient::new();
        client
            .expect_get_public_key()
            .withf(|key_id| key_id == "alias/token-signing")
            .times(1)
            .returning(move |_| Ok(der.clone()));

        let provider = AwsKmsKeyProvider::with_client(client);
        let key = provider.resolve(&key_id("alias/token-signing")).await.unwrap();

        assert_eq!(key.size_bits(), 2048);
        assert!(!key.can_sign());
    }

    #[tokio::test]
    async fn test_kms_key_cannot_sign() {
        let der = testutil::public_der(testutil::signing_key());
        let mut client = MockKmsClient::new();
        client
            .expect_get_public_key()
            .returning(move |_| Ok(der.clone()));

        let provider = AwsKmsKeyProvider::with_client(client);
        let key = provider.resolve(&key_id("alias/token-signing")).await.unwrap();

        let err = key
            .encoding_key()
            .err()
            .expect("public-only key must not sign");
        assert_eq!(err.kind(), AuthErrorKind::MaterialInvalid);
    }

    #[tokio::test]
    async fn test_kms_provider_propagates_not_found() {
        let mut client = MockKmsClient::new();
        client
            .expect_get_public_key()
            .returning(|key_id| Err(AuthError::identifier_not_found(key_id)));

        let provider = AwsKmsKeyProvider::with_client(client);

        let err = provider.resolve(&key_id("alias/missing")).await.unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::IdentifierNotFound);
    }

    #[tokio::test]
    async fn test_kms_provider_rejects_weak_key() {
        let der = testutil::public_der(testutil::weak_key());
        let mut client = MockKmsClient::new();
        client
            .expect_get_public_key()
            .returning(move |_| Ok(der.clone()));

        let provider = AwsKmsKeyProvider::with_client(client);

        let err = provider.resolve(&key_id("alias/weak")).await.unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::MaterialInvalid);
    }

    #[test]
    fn test_sdk_not_found_maps_to_identifier_not_found() {
        let service_error = GetPublicKeyError::NotFoundException(
            NotFoundException::builder().message("no such key").build(),
        );
        let err = SdkError::<GetPublicKeyError, ()>::service_error(service_error, ());

        let mapped = map_sdk_error("alias/missing", err);
        assert_eq!(mapped.kind(), AuthErrorKind::IdentifierNotFound);
        assert!(mapped.to_string().contains("alias/missing"));
    }

    #[test]
    fn test_sdk_timeout_maps_to_source_unavailable() {
        let err = SdkError::<GetPublicKeyError, ()>::timeout_error("operation timed out");

        let mapped = map_sdk_error("alias/token-signing", err);
        assert_eq!(mapped.kind(), AuthErrorKind::SourceUnavailable);
    }

    #[test]
    fn test_sdk_service_error_maps_to_backend() {
        let service_error = GetPublicKeyError::DisabledException(
            DisabledException::builder().message("key is disabled").build(),
        );
        let err = SdkError::<GetPublicKeyError, ()>::service_error(service_error, ());

        let mapped = map_sdk_error("alias/disabled", err);
        assert_eq!(mapped.kind(), AuthErrorKind::BackendError);
        assert!(mapped.to_string().contains("alias/disabled"));
    }

    #[tokio::test]
    async fn test_kms_provider_rejects_non_rsa_material() {
        let mut client = MockKmsClient::new();
        client
            .expect_get_public_key()
            .returning(|_| Ok(vec![0x30, 0x03, 0x02, 0x01, 0x01]));

        let provider = AwsKmsKeyProvider::with_client(client);

        let err = provider.resolve(&key_id("alias/ec")).await.unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::MaterialInvalid);
    }
}
