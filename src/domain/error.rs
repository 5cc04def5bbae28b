use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Why the verifier refused a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenRejection {
    /// Not a structurally valid compact JWT
    Malformed,
    /// Signature does not match the resolved key
    Signature,
    /// `exp` is in the past
    Expired,
    /// `nbf` is in the future
    NotYetValid,
    /// Issuer missing or not the configured one
    Issuer,
    /// Audience missing or not the configured one
    Audience,
    /// Header algorithm is not RS256
    Algorithm,
    /// Any other claim-level failure
    Claims,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TokenRejection::Malformed => "malformed",
            TokenRejection::Signature => "signature",
            TokenRejection::Expired => "expired",
            TokenRejection::NotYetValid => "not_yet_valid",
            TokenRejection::Issuer => "issuer",
            TokenRejection::Audience => "audience",
            TokenRejection::Algorithm => "algorithm",
            TokenRejection::Claims => "claims",
        };
        f.write_str(label)
    }
}

/// Fieldless view of [`AuthError`] for callers that only branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    ClaimsNotSet,
    ReservedClaim,
    ScatteredClaim,
    IdentifierNotSet,
    IdentifierNotFound,
    SourceUnavailable,
    MaterialInvalid,
    BackendError,
    TokenNotSet,
    TokenEmpty,
    TokenInvalid,
    Configuration,
}

/// Errors raised by key providers and the authentication service
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Claims are not set")]
    ClaimsNotSet,

    #[error("Claim '{name}' is reserved for the token policy")]
    ReservedClaim { name: String },

    #[error("Claim '{name}' repeats after other claims; repeated claims must be adjacent")]
    ScatteredClaim { name: String },

    #[error("Key identifier is not set")]
    IdentifierNotSet,

    #[error("Key ID '{key_id}' not found")]
    IdentifierNotFound { key_id: String },

    #[error("Key source unavailable: {message}")]
    SourceUnavailable {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Invalid key material: {message}")]
    MaterialInvalid {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Key backend error: {provider} - {message}")]
    Backend {
        provider: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Token is not set")]
    TokenNotSet,

    #[error("Token is empty")]
    TokenEmpty,

    #[error("Invalid token ({reason}): {message}")]
    TokenInvalid {
        reason: TokenRejection,
        message: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AuthError {
    pub fn reserved_claim(name: impl Into<String>) -> Self {
        Self::ReservedClaim { name: name.into() }
    }

    pub fn scattered_claim(name: impl Into<String>) -> Self {
        Self::ScatteredClaim { name: name.into() }
    }

    pub fn identifier_not_found(key_id: impl Into<String>) -> Self {
        Self::IdentifierNotFound {
            key_id: key_id.into(),
        }
    }

    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
            source: None,
        }
    }

    pub fn material_invalid(message: impl Into<String>) -> Self {
        Self::MaterialInvalid {
            message: message.into(),
            source: None,
        }
    }

    pub fn backend(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn token_invalid(reason: TokenRejection, message: impl Into<String>) -> Self {
        Self::TokenInvalid {
            reason,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Attach the underlying failure. Variants that carry no cause are returned unchanged.
    pub fn with_source(mut self, cause: impl Into<BoxError>) -> Self {
        match &mut self {
            Self::SourceUnavailable { source, .. }
            | Self::MaterialInvalid { source, .. }
            | Self::Backend { source, .. } => *source = Some(cause.into()),
            _ => {}
        }
        self
    }

    pub fn kind(&self) -> AuthErrorKind {
        match self {
            Self::ClaimsNotSet => AuthErrorKind::ClaimsNotSet,
            Self::ReservedClaim { .. } => AuthErrorKind::ReservedClaim,
            Self::ScatteredClaim { .. } => AuthErrorKind::ScatteredClaim,
            Self::IdentifierNotSet => AuthErrorKind::IdentifierNotSet,
            Self::IdentifierNotFound { .. } => AuthErrorKind::IdentifierNotFound,
            Self::SourceUnavailable { .. } => AuthErrorKind::SourceUnavailable,
            Self::MaterialInvalid { .. } => AuthErrorKind::MaterialInvalid,
            Self::Backend { .. } => AuthErrorKind::BackendError,
            Self::TokenNotSet => AuthErrorKind::TokenNotSet,
            Self::TokenEmpty => AuthErrorKind::TokenEmpty,
            Self::TokenInvalid { .. } => AuthErrorKind::TokenInvalid,
            Self::Configuration { .. } => AuthErrorKind::Configuration,
        }
    }

    /// Rejection reason when this is a `TokenInvalid` error
    pub fn rejection(&self) -> Option<TokenRejection> {
        match self {
            Self::TokenInvalid { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
