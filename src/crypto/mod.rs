//! Cryptographic primitives for EPM.
//!
//! This module provides:
//! - AES-256-GCM field encryption and decryption (`encryption`)
//! - Argon2id password-based key derivation (`kdf`)
//! - HKDF-based per-field sub-keys and the zeroizing `MasterKey` (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

pub use encryption::{decrypt, decrypt_field, encrypt, encrypt_field};
pub use kdf::{derive_master_key_with_params, generate_salt, Argon2Params};
pub use keys::{derive_field_key, Field, MasterKey};
