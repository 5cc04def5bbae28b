use serde::{Deserialize, Serialize};

use crate::domain::AuthError;

/// Logical name of a key, decoupled from where the key material lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyId(String);

impl KeyId {
    /// Create a key ID, rejecting empty or whitespace-only input
    pub fn new(id: impl Into<String>) -> Result<Self, AuthError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AuthError::IdentifierNotSet);
        }
        Ok(Self(id))
    }

    /// Validate an optional identifier coming from a caller
    ///
    /// Absent, empty and whitespace-only identifiers all fail with
    /// [`AuthError::IdentifierNotSet`]. This runs before any provider I/O.
    pub fn parse(id: Option<&str>) -> Result<Self, AuthError> {
        match id {
            Some(id) => Self::new(id),
            None => Err(AuthError::IdentifierNotSet),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for KeyId {
    type Error = AuthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KeyId> for String {
    fn from(id: KeyId) -> Self {
        id.0
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
