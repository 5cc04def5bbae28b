#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;
use tempfile::TempDir;

use pmp_token_auth::infrastructure::keys::LocalKeyProvider;
use pmp_token_auth::{AuthenticationService, JwtOptions};

pub const KEY_ID: &str = "Keys/private.xml";
pub const ISSUER: &str = "TestIssuer";
pub const AUDIENCE: &str = "TestAudience";

static SIGNING_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 2048).expect("generate 2048-bit key"));

static OTHER_SIGNING_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 2048).expect("generate 2048-bit key"));

static WEAK_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 1024).expect("generate 1024-bit key"));

/// 2048-bit key shared by every test in the binary
pub fn signing_key() -> &'static RsaPrivateKey {
    &SIGNING_KEY
}

/// A second 2048-bit key, unrelated to [`signing_key`]
pub fn other_signing_key() -> &'static RsaPrivateKey {
    &OTHER_SIGNING_KEY
}

/// 1024-bit key, below the accepted floor
pub fn weak_key() -> &'static RsaPrivateKey {
    &WEAK_KEY
}

pub fn private_pem(key: &RsaPrivateKey) -> String {
    key.to_pkcs8_pem(LineEnding::LF)
        .expect("encode PKCS#8")
        .to_string()
}

pub fn public_pem(key: &RsaPrivateKey) -> String {
    key.to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("encode SPKI")
}

pub fn pkcs1_pem(key: &RsaPrivateKey) -> String {
    key.to_pkcs1_pem(LineEnding::LF)
        .expect("encode PKCS#1")
        .to_string()
}

pub fn write_key_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write key file");
    path
}

/// Key files on disk plus the options mapping `KEY_ID` to one of them
pub struct Fixture {
    pub dir: TempDir,
    pub options: JwtOptions,
}

impl Fixture {
    /// Map `KEY_ID` to a file holding `contents`
    pub fn with_key_file(contents: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = write_key_file(dir.path(), "private.pem", contents);
        let options = JwtOptions::new(ISSUER, AUDIENCE, 30).with_key_path(KEY_ID, path);

        Self { dir, options }
    }

    pub fn signing() -> Self {
        Self::with_key_file(&private_pem(signing_key()))
    }

    pub fn service(&self) -> AuthenticationService {
        service_with(self.options.clone())
    }
}

pub fn service_with(options: JwtOptions) -> AuthenticationService {
    let provider = LocalKeyProvider::from_options(&options);
    AuthenticationService::new(options, Arc::new(provider)).expect("valid options")
}
