//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  The parameters used to create a store are written
//! to its header so every later open derives the same key.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::errors::{EpmError, Result};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Name written to the store header next to the parameters.
pub const KDF_ALGORITHM: &str = "argon2id-v19";

/// Minimum safe memory cost in KiB (8 MB).
pub const MIN_MEMORY_KIB: u32 = 8_192;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// Reject parameters below the safety floor.
    pub fn validate(&self) -> Result<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(EpmError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if self.iterations < 1 {
            return Err(EpmError::KeyDerivationFailed(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if self.parallelism < 1 {
            return Err(EpmError::KeyDerivationFailed(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Derive a 32-byte master key with explicit Argon2id parameters.
///
/// The same password + salt + params will always produce the same key.
/// Parameters below the safety floor are rejected.
pub fn derive_master_key_with_params(
    password: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
) -> Result<[u8; KEY_LEN]> {
    argon2_params.validate()?;

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| EpmError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| EpmError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: Argon2Params = Argon2Params {
        memory_kib: MIN_MEMORY_KIB,
        iterations: 1,
        parallelism: 1,
    };

    #[test]
    fn rejects_memory_below_floor() {
        let params = Argon2Params {
            memory_kib: MIN_MEMORY_KIB - 1,
            ..FAST
        };
        let result = derive_master_key_with_params(b"pw", &[0u8; SALT_LEN], &params);
        assert!(matches!(result, Err(EpmError::KeyDerivationFailed(_))));
    }

    #[test]
    fn rejects_zero_iterations_and_lanes() {
        let no_iter = Argon2Params {
            iterations: 0,
            ..FAST
        };
        let no_lanes = Argon2Params {
            parallelism: 0,
            ..FAST
        };
        assert!(derive_master_key_with_params(b"pw", &[0u8; SALT_LEN], &no_iter).is_err());
        assert!(derive_master_key_with_params(b"pw", &[0u8; SALT_LEN], &no_lanes).is_err());
    }

    #[test]
    fn params_change_the_key() {
        let salt = [7u8; SALT_LEN];
        let a = derive_master_key_with_params(b"pw", &salt, &FAST).unwrap();
        let b = derive_master_key_with_params(
            b"pw",
            &salt,
            &Argon2Params {
                iterations: 2,
                ..FAST
            },
        )
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn default_params_pass_validation() {
        assert!(Argon2Params::default().validate().is_ok());
        assert!(FAST.validate().is_ok());
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
