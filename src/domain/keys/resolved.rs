use std::fmt::Debug;

use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use super::KeyId;
use crate::domain::AuthError;

/// Smallest RSA modulus accepted for signing or verification
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// RSA key material as returned by a backend
#[derive(Clone)]
pub enum KeyMaterial {
    /// Full key pair, usable for signing and verification
    Private(RsaPrivateKey),
    /// Public half only, usable for verification
    Public(RsaPublicKey),
}

impl KeyMaterial {
    pub fn size_bits(&self) -> usize {
        match self {
            KeyMaterial::Private(key) => key.n().bits(),
            KeyMaterial::Public(key) => key.n().bits(),
        }
    }
}

/// A key that passed format and strength checks
///
/// Only constructible through [`ResolvedKey::new`], so holding one means the
/// modulus is at least [`MIN_RSA_KEY_BITS`].
#[derive(Clone)]
pub struct ResolvedKey {
    key_id: KeyId,
    material: KeyMaterial,
}

impl Debug for ResolvedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedKey")
            .field("key_id", &self.key_id)
            .field("size_bits", &self.size_bits())
            .field("can_sign", &self.can_sign())
            .field("material", &"[hidden]")
            .finish()
    }
}

impl ResolvedKey {
    pub fn new(key_id: KeyId, material: KeyMaterial) -> Result<Self, AuthError> {
        let bits = material.size_bits();
        if bits < MIN_RSA_KEY_BITS {
            return Err(AuthError::material_invalid(format!(
                "RSA key size must be at least {} bits, key '{}' has {} bits",
                MIN_RSA_KEY_BITS, key_id, bits
            )));
        }

        Ok(Self { key_id, material })
    }

    pub fn private(key_id: KeyId, key: RsaPrivateKey) -> Result<Self, AuthError> {
        Self::new(key_id, KeyMaterial::Private(key))
    }

    pub fn public(key_id: KeyId, key: RsaPublicKey) -> Result<Self, AuthError> {
        Self::new(key_id, KeyMaterial::Public(key))
    }

    pub fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    pub fn size_bits(&self) -> usize {
        self.material.size_bits()
    }

    /// Whether the private half is available
    pub fn can_sign(&self) -> bool {
        matches!(self.material, KeyMaterial::Private(_))
    }

    pub fn public_key(&self) -> RsaPublicKey {
        match &self.material {
            KeyMaterial::Private(key) => key.to_public_key(),
            KeyMaterial::Public(key) => key.clone(),
        }
    }

    /// Signing key for the token codec; fails for public-only material
    pub fn encoding_key(&self) -> Result<EncodingKey, AuthError> {
        let KeyMaterial::Private(private_key) = &self.material else {
            return Err(AuthError::material_invalid(format!(
                "Key '{}' only exposes public material and cannot sign tokens",
                self.key_id
            )));
        };

        let der = private_key.to_pkcs1_der().map_err(|e| {
            AuthError::material_invalid(format!(
                "Failed to encode RSA private key '{}': {}",
                self.key_id, e
            ))
            .with_source(e)
        })?;

        Ok(EncodingKey::from_rsa_der(der.as_bytes()))
    }

    /// Verification key for the token codec
    pub fn decoding_key(&self) -> Result<DecodingKey, AuthError> {
        let der = self.public_key().to_pkcs1_der().map_err(|e| {
            AuthError::material_invalid(format!(
                "Failed to encode RSA public key '{}': {}",
                self.key_id, e
            ))
            .with_source(e)
        })?;

        Ok(DecodingKey::from_rsa_der(der.as_bytes()))
    }
}
