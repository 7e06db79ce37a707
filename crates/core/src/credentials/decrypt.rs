//! Shared payload decryption.
//!
//! Two schemes appear in vendor secret payloads, both base64 at the
//! boundary:
//! - AES-256-GCM with a 12-byte nonce prefix and 16-byte tag suffix.
//! - One-time-pad XOR where the key must cover the whole payload.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::error::CredentialError;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Decrypts an AES-256-GCM payload. The payload layout is
/// `nonce (12) || ciphertext || tag (16)`, base64-encoded.
pub fn decrypt_aes_gcm(key: &[u8], payload_b64: &str) -> Result<Vec<u8>, CredentialError> {
    if key.len() != KEY_LEN {
        return Err(CredentialError::Decrypt(format!(
            "aes-256-gcm key must be {KEY_LEN} bytes, got {}",
            key.len()
        )));
    }

    let payload = BASE64
        .decode(payload_b64)
        .map_err(|e| CredentialError::Decrypt(format!("payload is not valid base64: {e}")))?;

    if payload.len() < NONCE_LEN + TAG_LEN {
        return Err(CredentialError::Decrypt(format!(
            "payload too short: {} bytes, need at least {}",
            payload.len(),
            NONCE_LEN + TAG_LEN
        )));
    }

    let (nonce, ciphertext) = payload.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CredentialError::Decrypt(e.to_string()))?;

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CredentialError::Decrypt("authentication failed".to_string()))
}

/// Decrypts a one-time-pad XOR payload. The key must be at least as
/// long as the payload; anything shorter would repeat and is rejected.
pub fn decrypt_xor(key: &[u8], payload_b64: &str) -> Result<Vec<u8>, CredentialError> {
    let payload = BASE64
        .decode(payload_b64)
        .map_err(|e| CredentialError::Decrypt(format!("payload is not valid base64: {e}")))?;

    if key.len() < payload.len() {
        return Err(CredentialError::Decrypt(format!(
            "xor key ({} bytes) shorter than payload ({} bytes)",
            key.len(),
            payload.len()
        )));
    }

    Ok(payload
        .iter()
        .zip(key.iter())
        .map(|(byte, key_byte)| byte ^ key_byte)
        .collect())
}
