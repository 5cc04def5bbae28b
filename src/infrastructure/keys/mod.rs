//! Key provider implementations

mod aws_kms_provider;
mod azure_key_vault_provider;
mod cached_provider;
mod factory;
mod local_provider;
pub mod material;
mod vault_provider;

pub use aws_kms_provider::{AwsKmsClient, AwsKmsKeyProvider, KmsClient};
pub use azure_key_vault_provider::{
    AzureKeyClient, AzureKeyVaultConfig, AzureKeyVaultKeyProvider, HttpAzureKeyClient, JsonWebKey,
};
pub use cached_provider::CachedKeyProvider;
pub use factory::{KeyProviderFactory, ProviderConfig};
pub use local_provider::LocalKeyProvider;
pub use vault_provider::{
    HttpVaultClient, VaultClient, VaultConfig, VaultKeyMapping, VaultKeyProvider,
};
