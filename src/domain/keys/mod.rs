//! Key resolution domain

mod key_id;
mod provider;
mod resolved;

pub use key_id::KeyId;
pub use provider::KeyProvider;
pub use resolved::{KeyMaterial, ResolvedKey, MIN_RSA_KEY_BITS};

#[cfg(test)]
pub use provider::mock;
