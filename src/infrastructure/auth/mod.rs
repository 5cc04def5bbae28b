//! Token issuance and validation
//!
//! Tokens are RS256 JWTs signed with keys resolved through a
//! [`KeyProvider`](crate::domain::KeyProvider).

pub mod jwt;
mod refresh_token;
mod service;

pub use jwt::{IssueParams, VerificationRules, TOKEN_ALGORITHM};
pub use refresh_token::{generate_refresh_token, REFRESH_TOKEN_BYTES};
pub use service::{AuthenticationService, TokenAuthenticator};
