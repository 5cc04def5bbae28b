//! PMP Token Auth
//!
//! Issues and validates RS256 bearer tokens signed with keys resolved by
//! logical identifier from pluggable key sources:
//! - Local PEM files
//! - AWS KMS (public keys, verification only)
//! - HashiCorp Vault KV v2
//!
//! Resolved keys can be kept in a TTL cache in front of any source.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod testutil;

pub use config::{AppConfig, JwtOptions};
pub use domain::{
    AuthError, AuthErrorKind, Claim, ClaimSet, KeyId, KeyProvider, ResolvedKey, TokenPrincipal,
};
pub use infrastructure::auth::{AuthenticationService, TokenAuthenticator};
