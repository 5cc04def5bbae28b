use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::material::parse_pem_key;
use crate::config::JwtOptions;
use crate::domain::{AuthError, KeyId, KeyProvider, ResolvedKey};

/// Key provider that reads PEM files from the local filesystem
///
/// Each key ID maps to one file; see [`super::material`] for the accepted
/// encodings. Files are read on every call.
#[derive(Debug, Clone, Default)]
pub struct LocalKeyProvider {
    key_paths: HashMap<String, PathBuf>,
}

impl LocalKeyProvider {
    pub fn new(key_paths: HashMap<String, PathBuf>) -> Self {
        Self { key_paths }
    }

    pub fn from_options(options: &JwtOptions) -> Self {
        Self::new(options.key_paths.clone())
    }

    pub fn with_key(mut self, key_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.key_paths.insert(key_id.into(), path.into());
        self
    }

    fn locate(&self, key_id: &KeyId) -> Result<&Path, AuthError> {
        let path = self
            .key_paths
            .get(key_id.as_str())
            .ok_or_else(|| AuthError::identifier_not_found(key_id.as_str()))?;

        if path.as_os_str().is_empty() || path.to_string_lossy().trim().is_empty() {
            return Err(AuthError::IdentifierNotSet);
        }

        Ok(path)
    }

    async fn read_key_file(&self, key_id: &KeyId, path: &Path) -> Result<String, AuthError> {
        tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AuthError::source_unavailable(format!(
                "Key file '{}' for key '{}' not found",
                path.display(),
                key_id
            ))
            .with_source(e),
            ErrorKind::InvalidData => AuthError::material_invalid(format!(
                "Key file '{}' for key '{}' is not UTF-8 text",
                path.display(),
                key_id
            ))
            .with_source(e),
            _ => AuthError::backend(
                self.provider_name(),
                format!("Failed to read key file '{}': {}", path.display(), e),
            )
            .with_source(e),
        })
    }
}

#[async_trait]
impl KeyProvider for LocalKeyProvider {
    async fn resolve(&self, key_id: &KeyId) -> Result<ResolvedKey, AuthError> {
        let path = self.locate(key_id)?;

        tracing::debug!(
            provider = self.provider_name(),
            key_id = %key_id,
            path = %path.display(),
            "Reading key file"
        );

        let contents = self.read_key_file(key_id, path).await?;
        parse_pem_key(key_id, &contents)
    }

    fn provider_name(&self) -> &'static str {
        "local"
    }
}
