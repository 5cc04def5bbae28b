//! RS256 JWT signing and verification over resolved keys

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::config::JwtOptions;
use crate::domain::{AuthError, ClaimSet, ResolvedKey, TokenPrincipal, TokenRejection};

/// Signature algorithm for every token
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::RS256;

/// Policy fields written into a new token
#[derive(Debug, Clone)]
pub struct IssueParams<'a> {
    pub issuer: Option<&'a str>,
    pub audience: Option<&'a str>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Checks applied when verifying a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRules {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub validate_lifetime: bool,
    pub leeway_seconds: u64,
}

impl VerificationRules {
    pub fn from_options(options: &JwtOptions) -> Self {
        Self {
            issuer: options.issuer_policy().map(str::to_string),
            audience: options.audience_policy().map(str::to_string),
            validate_lifetime: options.validate_lifetime,
            leeway_seconds: options.clock_skew_seconds,
        }
    }

    fn to_validation(&self) -> Validation {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = self.leeway_seconds;
        validation.validate_exp = self.validate_lifetime;
        validation.validate_nbf = self.validate_lifetime;
        validation.required_spec_claims = if self.validate_lifetime {
            HashSet::from(["exp".to_string()])
        } else {
            HashSet::new()
        };

        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        validation
    }

    /// Reject a verified payload that omits a configured policy claim
    ///
    /// `Validation` only compares `iss`/`aud` when the token carries them, and
    /// its required-claim set is unordered, so presence is checked here with
    /// the issuer first.
    fn require_policy_claims(&self, payload: &Map<String, Value>) -> Result<(), AuthError> {
        if self.issuer.is_some() && !payload.contains_key("iss") {
            return Err(AuthError::token_invalid(
                TokenRejection::Issuer,
                "Token has no issuer claim",
            ));
        }

        if self.audience.is_some() && !payload.contains_key("aud") {
            return Err(AuthError::token_invalid(
                TokenRejection::Audience,
                "Token has no audience claim",
            ));
        }

        Ok(())
    }
}

/// Serialize and sign claims with the resolved key
pub fn sign_token(
    claims: &ClaimSet,
    params: &IssueParams<'_>,
    key: &ResolvedKey,
) -> Result<String, AuthError> {
    let mut payload = claims.to_payload()?;

    if let Some(issuer) = params.issuer {
        payload.insert("iss".to_string(), Value::from(issuer));
    }
    if let Some(audience) = params.audience {
        payload.insert("aud".to_string(), Value::from(audience));
    }
    payload.insert("iat".to_string(), Value::from(params.issued_at.timestamp()));
    payload.insert("exp".to_string(), Value::from(params.expires_at.timestamp()));

    let mut header = Header::new(TOKEN_ALGORITHM);
    header.kid = Some(key.key_id().to_string());

    encode(&header, &payload, &key.encoding_key()?).map_err(|e| {
        AuthError::material_invalid(format!(
            "Failed to sign token with key '{}': {}",
            key.key_id(),
            e
        ))
        .with_source(e)
    })
}

/// Parse and verify a token, returning its principal
pub fn verify_token(
    token: &str,
    key: &ResolvedKey,
    rules: &VerificationRules,
) -> Result<TokenPrincipal, AuthError> {
    let validation = rules.to_validation();
    let token_data = decode::<Map<String, Value>>(token, &key.decoding_key()?, &validation)
        .map_err(|e| reject(&e))?;
    rules.require_policy_claims(&token_data.claims)?;

    Ok(TokenPrincipal::from_payload(&token_data.claims))
}

fn reject(error: &JwtError) -> AuthError {
    let reason = match error.kind() {
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => TokenRejection::Malformed,
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidRsaKey(_)
        | ErrorKind::InvalidKeyFormat
        | ErrorKind::Crypto(_) => TokenRejection::Signature,
        ErrorKind::ExpiredSignature => TokenRejection::Expired,
        ErrorKind::ImmatureSignature => TokenRejection::NotYetValid,
        ErrorKind::InvalidIssuer => TokenRejection::Issuer,
        ErrorKind::InvalidAudience => TokenRejection::Audience,
        ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => TokenRejection::Algorithm,
        ErrorKind::MissingRequiredClaim(claim) => match claim.as_str() {
            "iss" => TokenRejection::Issuer,
            "aud" => TokenRejection::Audience,
            "exp" | "nbf" => TokenRejection::Expired,
            _ => TokenRejection::Claims,
        },
        _ => TokenRejection::Claims,
    };

    AuthError::token_invalid(reason, error.to_string())
}
