//! Refresh token generation

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;

/// Random bytes behind every refresh token
pub const REFRESH_TOKEN_BYTES: usize = 64;

/// Generate an opaque refresh token
///
/// The token is 64 bytes from the operating system RNG, encoded as padded
/// standard base64 (88 characters).
pub fn generate_refresh_token() -> String {
    let mut random_bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut random_bytes);

    STANDARD.encode(random_bytes)
}
