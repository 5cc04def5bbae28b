//! Domain layer - Key resolution and token contracts

pub mod error;
pub mod keys;
pub mod token;

pub use error::{AuthError, AuthErrorKind, TokenRejection};
pub use keys::{KeyId, KeyMaterial, KeyProvider, ResolvedKey, MIN_RSA_KEY_BITS};
pub use token::{Claim, ClaimSet, TokenPrincipal, REGISTERED_CLAIMS};
