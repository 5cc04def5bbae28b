//! Shared key fixtures for unit tests
//!
//! RSA generation is slow in debug builds, so each key is generated once per
//! test binary.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;

use crate::domain::{KeyId, ResolvedKey};

static SIGNING_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 2048).expect("generate 2048-bit key"));

static OTHER_SIGNING_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 2048).expect("generate 2048-bit key"));

static WEAK_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 1024).expect("generate 1024-bit key"));

pub fn signing_key() -> &'static RsaPrivateKey {
    &SIGNING_KEY
}

pub fn other_signing_key() -> &'static RsaPrivateKey {
    &OTHER_SIGNING_KEY
}

pub fn weak_key() -> &'static RsaPrivateKey {
    &WEAK_KEY
}

pub fn private_pem(key: &RsaPrivateKey) -> String {
    key.to_pkcs8_pem(LineEnding::LF)
        .expect("encode PKCS#8 PEM")
        .as_str()
        .to_owned()
}

pub fn public_pem(key: &RsaPrivateKey) -> String {
    key.to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("encode SPKI PEM")
}

pub fn pkcs1_pem(key: &RsaPrivateKey) -> String {
    key.to_pkcs1_pem(LineEnding::LF)
        .expect("encode PKCS#1 PEM")
        .as_str()
        .to_owned()
}

pub fn public_der(key: &RsaPrivateKey) -> Vec<u8> {
    key.to_public_key()
        .to_public_key_der()
        .expect("encode SPKI DER")
        .as_bytes()
        .to_vec()
}

pub fn resolved_key(key_id: &str) -> ResolvedKey {
    ResolvedKey::private(KeyId::new(key_id).unwrap(), signing_key().clone()).unwrap()
}

pub fn write_key_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write key file");
    path
}
