//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! before decrypting.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]
//!
//! The associated data (`aad`) is authenticated but not stored: a blob
//! only opens with the same `aad` it was sealed with.

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroize;

use super::keys::{Field, MasterKey};
use crate::errors::{EpmError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` with a 32-byte `key`, binding `aad`.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| EpmError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|e| EpmError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `encrypt` with the same `aad`.
///
/// Any failure (short blob, wrong key, wrong `aad`, flipped bit) is
/// reported as `AuthenticationFailure` and nothing else.
pub fn decrypt(key: &[u8], ciphertext_with_nonce: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    if ciphertext_with_nonce.len() < NONCE_LEN + TAG_LEN {
        return Err(EpmError::AuthenticationFailure);
    }

    let (nonce_bytes, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EpmError::AuthenticationFailure)?;

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| EpmError::AuthenticationFailure)
}

/// Encrypt a single confidential field.
///
/// The field's sub-key is derived from the master key and zeroized
/// as soon as the ciphertext exists.  `aad` names the owner of the
/// value (a record id, or the store header).
pub fn encrypt_field(
    master_key: &MasterKey,
    field: Field,
    aad: &[u8],
    plaintext: &str,
) -> Result<Vec<u8>> {
    let mut field_key = master_key.derive_field_key(field)?;
    let blob = encrypt(&field_key, plaintext.as_bytes(), aad);
    field_key.zeroize();
    blob
}

/// Decrypt a single confidential field back into a `String`.
pub fn decrypt_field(
    master_key: &MasterKey,
    field: Field,
    aad: &[u8],
    blob: &[u8],
) -> Result<String> {
    let mut field_key = master_key.derive_field_key(field)?;
    let plaintext = decrypt(&field_key, blob, aad);
    field_key.zeroize();

    // A blob that authenticates but is not UTF-8 was not written by us.
    String::from_utf8(plaintext?).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        EpmError::AuthenticationFailure
    })
}
