//! Key derivation helpers using HKDF-SHA256.
//!
//! From the Argon2id master key we derive one independent sub-key per
//! confidential field kind, plus one for the store's verification blob.
//! HKDF (RFC 5869) uses the master key as input keying material and a
//! context string (`info`) to separate the sub-keys.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::errors::{EpmError, Result};

/// Length of derived sub-keys (256 bits).
const KEY_LEN: usize = 32;

/// The kinds of data encrypted under the master key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Password,
    OtpSecret,
    BackupCodes,
    /// Known plaintext checked on open to validate the master password.
    Verifier,
}

impl Field {
    /// Context label bound into the HKDF `info`.
    pub fn label(self) -> &'static str {
        match self {
            Field::Password => "password",
            Field::OtpSecret => "otp-secret",
            Field::BackupCodes => "backup-codes",
            Field::Verifier => "verifier",
        }
    }
}

/// Derive the sub-key for one field kind from the master key.
///
/// `info` is `"epm-field:<label>"`.
pub fn derive_field_key(master_key: &[u8], field: Field) -> Result<[u8; KEY_LEN]> {
    let info = format!("epm-field:{}", field.label());
    hkdf_derive(master_key, info.as_bytes())
}

/// Run HKDF-SHA256 with no salt; the master key is already uniform
/// (it came from Argon2id).
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| EpmError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A wrapper around a 32-byte master key that zeroes its memory when
/// dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Derive the sub-key for `field`.
    pub fn derive_field_key(&self, field: Field) -> Result<[u8; KEY_LEN]> {
        derive_field_key(&self.bytes, field)
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(<redacted>)")
    }
}
