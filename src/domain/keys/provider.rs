use async_trait::async_trait;
use std::fmt::Debug;

use super::{KeyId, ResolvedKey};
use crate::domain::AuthError;

/// Trait for key providers (local files, AWS KMS, Vault, etc.)
///
/// Implementations must never hand back an unchecked key: success means the
/// material parsed and passed the size floor enforced by [`ResolvedKey`].
#[async_trait]
pub trait KeyProvider: Send + Sync + Debug {
    /// Resolve a key by its identifier
    async fn resolve(&self, key_id: &KeyId) -> Result<ResolvedKey, AuthError>;

    /// Resolve a key bypassing any cached copy (for rotation support)
    async fn refresh(&self, key_id: &KeyId) -> Result<ResolvedKey, AuthError> {
        self.resolve(key_id).await
    }

    /// Get provider name for logging/debugging
    fn provider_name(&self) -> &'static str;
}
