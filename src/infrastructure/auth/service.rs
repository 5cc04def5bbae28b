use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::fmt::Debug;
use std::sync::Arc;

use super::jwt::{sign_token, verify_token, IssueParams, VerificationRules};
use super::refresh_token::generate_refresh_token;
use crate::config::JwtOptions;
use crate::domain::{AuthError, ClaimSet, KeyId, KeyProvider, ResolvedKey, TokenPrincipal};

/// Issues and validates bearer tokens
#[async_trait]
pub trait TokenAuthenticator: Send + Sync + Debug {
    /// Generate an opaque refresh token
    fn generate_refresh_token_string(&self) -> String;

    /// Sign the claims with the key behind `key_id`
    async fn generate_token(
        &self,
        claims: Option<&ClaimSet>,
        key_id: Option<&str>,
    ) -> Result<String, AuthError>;

    /// Resolve the key behind `key_id`
    async fn get_security_key(&self, key_id: Option<&str>) -> Result<ResolvedKey, AuthError>;

    /// Validate a token and recover its claims
    async fn get_token_principal(
        &self,
        token: Option<&str>,
        key_id: Option<&str>,
    ) -> Result<TokenPrincipal, AuthError>;
}

/// Token service backed by a key provider and a fixed policy
#[derive(Clone, Debug)]
pub struct AuthenticationService {
    options: Arc<JwtOptions>,
    rules: Arc<VerificationRules>,
    provider: Arc<dyn KeyProvider>,
}

impl AuthenticationService {
    pub fn new(options: JwtOptions, provider: Arc<dyn KeyProvider>) -> Result<Self, AuthError> {
        options.validate()?;

        let rules = VerificationRules::from_options(&options);
        Ok(Self {
            options: Arc::new(options),
            rules: Arc::new(rules),
            provider,
        })
    }

    pub fn options(&self) -> &JwtOptions {
        &self.options
    }

    pub fn provider(&self) -> &Arc<dyn KeyProvider> {
        &self.provider
    }

    async fn resolve(&self, key_id: Option<&str>) -> Result<ResolvedKey, AuthError> {
        let key_id = KeyId::parse(key_id)?;
        self.provider.resolve(&key_id).await
    }
}

#[async_trait]
impl TokenAuthenticator for AuthenticationService {
    fn generate_refresh_token_string(&self) -> String {
        generate_refresh_token()
    }

    async fn generate_token(
        &self,
        claims: Option<&ClaimSet>,
        key_id: Option<&str>,
    ) -> Result<String, AuthError> {
        let claims = claims.ok_or(AuthError::ClaimsNotSet)?;
        claims.validate()?;

        let key = self.resolve(key_id).await?;

        let issued_at = Utc::now();
        let expires_at = issued_at + Duration::minutes(i64::from(self.options.expiration_minutes));
        let params = IssueParams {
            issuer: self.options.issuer_policy(),
            audience: self.options.audience_policy(),
            issued_at,
            expires_at,
        };

        let token = sign_token(claims, &params, &key)?;

        tracing::debug!(
            provider = self.provider.provider_name(),
            key_id = %key.key_id(),
            claims = claims.len(),
            expires_at = %expires_at,
            "Issued token"
        );

        Ok(token)
    }

    async fn get_security_key(&self, key_id: Option<&str>) -> Result<ResolvedKey, AuthError> {
        self.resolve(key_id).await
    }

    async fn get_token_principal(
        &self,
        token: Option<&str>,
        key_id: Option<&str>,
    ) -> Result<TokenPrincipal, AuthError> {
        let token = token.ok_or(AuthError::TokenNotSet)?;
        if token.trim().is_empty() {
            return Err(AuthError::TokenEmpty);
        }

        let key = self.resolve(key_id).await?;

        verify_token(token, &key, &self.rules).inspect_err(|e| {
            tracing::warn!(
                provider = self.provider.provider_name(),
                key_id = %key.key_id(),
                error = %e,
                "Rejected token"
            );
        })
    }
}
