use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::AuthError;

/// Token policy shared by every token one service instance issues
///
/// An empty `issuer` or `audience` is not an error: it switches the matching
/// claim off, both when signing and when validating.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct JwtOptions {
    pub issuer: String,
    pub audience: String,
    /// Token lifetime, counted from issuance
    pub expiration_minutes: u32,
    /// Key ID to PEM file location, used by the local key provider
    pub key_paths: HashMap<String, PathBuf>,
    /// Enforce `exp`/`nbf` when validating
    pub validate_lifetime: bool,
    /// Leeway applied to lifetime checks
    pub clock_skew_seconds: u64,
}

impl Default for JwtOptions {
    fn default() -> Self {
        Self {
            issuer: "pmp-token-auth".to_string(),
            audience: String::new(),
            expiration_minutes: 30,
            key_paths: HashMap::new(),
            validate_lifetime: true,
            clock_skew_seconds: 60,
        }
    }
}

impl JwtOptions {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        expiration_minutes: u32,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            expiration_minutes,
            ..Self::default()
        }
    }

    pub fn with_key_path(mut self, key_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.key_paths.insert(key_id.into(), path.into());
        self
    }

    pub fn with_validate_lifetime(mut self, validate_lifetime: bool) -> Self {
        self.validate_lifetime = validate_lifetime;
        self
    }

    pub fn with_clock_skew_seconds(mut self, seconds: u64) -> Self {
        self.clock_skew_seconds = seconds;
        self
    }

    /// Issuer to embed and enforce, `None` when not configured
    pub fn issuer_policy(&self) -> Option<&str> {
        non_blank(&self.issuer)
    }

    /// Audience to embed and enforce, `None` when not configured
    pub fn audience_policy(&self) -> Option<&str> {
        non_blank(&self.audience)
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if self.expiration_minutes == 0 {
            return Err(AuthError::configuration(
                "expiration_minutes must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
