//! Integration tests for the EPM crypto module.

use epm::crypto::encryption::{NONCE_LEN, TAG_LEN};
use epm::crypto::kdf::MIN_MEMORY_KIB;
use epm::crypto::{
    decrypt, decrypt_field, derive_field_key, derive_master_key_with_params, encrypt,
    encrypt_field, generate_salt, Argon2Params, Field, MasterKey,
};
use epm::errors::EpmError;

fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: MIN_MEMORY_KIB,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Encryption round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = [0xABu8; 32];
    let plaintext = b"correct horse battery staple";

    let ciphertext = encrypt(&key, plaintext, b"").expect("encrypt should succeed");

    // Nonce in front, tag at the end.
    assert_eq!(ciphertext.len(), NONCE_LEN + plaintext.len() + TAG_LEN);

    let recovered = decrypt(&key, &ciphertext, b"").expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn encrypt_produces_different_ciphertext_each_time() {
    let key = [0xCDu8; 32];
    let plaintext = b"hunter2";

    let ct1 = encrypt(&key, plaintext, b"").expect("encrypt 1");
    let ct2 = encrypt(&key, plaintext, b"").expect("encrypt 2");

    assert_ne!(ct1[..NONCE_LEN], ct2[..NONCE_LEN], "nonces must differ");
    assert_ne!(ct1, ct2, "two encryptions of the same plaintext must differ");
}

#[test]
fn decrypt_with_wrong_key_is_authentication_failure() {
    let ciphertext = encrypt(&[0x11u8; 32], b"42", b"").expect("encrypt");
    assert!(matches!(
        decrypt(&[0x22u8; 32], &ciphertext, b""),
        Err(EpmError::AuthenticationFailure)
    ));
}

#[test]
fn decrypt_with_truncated_data_fails() {
    let key = [0xAAu8; 32];
    assert!(decrypt(&key, &[0u8; 5], b"").is_err());
}

#[test]
fn decrypt_with_corrupted_ciphertext_fails() {
    let key = [0xBBu8; 32];
    let mut ciphertext = encrypt(&key, b"VALUE=abc", b"").expect("encrypt");
    // Flip a byte after the nonce.
    ciphertext[NONCE_LEN + 1] ^= 0xFF;

    assert!(matches!(
        decrypt(&key, &ciphertext, b""),
        Err(EpmError::AuthenticationFailure)
    ));
}

#[test]
fn decrypt_requires_the_same_associated_data() {
    let key = [0xC3u8; 32];
    let ciphertext = encrypt(&key, b"secret", &7i64.to_be_bytes()).expect("encrypt");

    assert_eq!(
        decrypt(&key, &ciphertext, &7i64.to_be_bytes()).unwrap(),
        b"secret"
    );
    assert!(matches!(
        decrypt(&key, &ciphertext, &8i64.to_be_bytes()),
        Err(EpmError::AuthenticationFailure)
    ));
}

// ---------------------------------------------------------------------------
// Key derivation (Argon2id)
// ---------------------------------------------------------------------------

#[test]
fn derive_master_key_is_deterministic() {
    let salt = generate_salt();
    let key1 = derive_master_key_with_params(b"passphrase", &salt, &fast_params()).unwrap();
    let key2 = derive_master_key_with_params(b"passphrase", &salt, &fast_params()).unwrap();
    assert_eq!(key1, key2);
}

#[test]
fn derive_master_key_depends_on_salt_and_password() {
    let salt1 = generate_salt();
    let salt2 = generate_salt();
    assert_ne!(salt1, salt2);

    let a = derive_master_key_with_params(b"same", &salt1, &fast_params()).unwrap();
    let b = derive_master_key_with_params(b"same", &salt2, &fast_params()).unwrap();
    let c = derive_master_key_with_params(b"other", &salt1, &fast_params()).unwrap();
    assert_ne!(a, b);
    assert_ne!(a, c);
}

#[test]
fn derive_master_key_rejects_tiny_memory_cost() {
    let params = Argon2Params {
        memory_kib: MIN_MEMORY_KIB - 1,
        iterations: 1,
        parallelism: 1,
    };
    assert!(derive_master_key_with_params(b"pw", &generate_salt(), &params).is_err());
}

// ---------------------------------------------------------------------------
// HKDF per-field key derivation
// ---------------------------------------------------------------------------

#[test]
fn each_field_gets_its_own_key() {
    let master = [0x99u8; 32];
    let keys: Vec<_> = [
        Field::Password,
        Field::OtpSecret,
        Field::BackupCodes,
        Field::Verifier,
    ]
    .into_iter()
    .map(|f| derive_field_key(&master, f).unwrap())
    .collect();

    for (i, a) in keys.iter().enumerate() {
        for b in &keys[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn master_key_wrapper_matches_free_function() {
    let raw = [0x44u8; 32];
    let mk = MasterKey::new(raw);

    let via_wrapper = mk.derive_field_key(Field::Password).unwrap();
    let via_fn = derive_field_key(&raw, Field::Password).unwrap();
    assert_eq!(via_wrapper, via_fn);
}

// ---------------------------------------------------------------------------
// End-to-end: password -> master key -> field key -> encrypt/decrypt
// ---------------------------------------------------------------------------

#[test]
fn full_crypto_pipeline() {
    let salt = generate_salt();
    let master =
        MasterKey::new(derive_master_key_with_params(b"hunter2", &salt, &fast_params()).unwrap());

    let blob = encrypt_field(&master, Field::OtpSecret, b"rec", "JBSWY3DPEHPK3PXP").unwrap();
    assert_eq!(
        decrypt_field(&master, Field::OtpSecret, b"rec", &blob).unwrap(),
        "JBSWY3DPEHPK3PXP"
    );

    // A blob sealed for one field does not open as another.
    assert!(decrypt_field(&master, Field::Password, b"rec", &blob).is_err());
    // Nor under another record's associated data.
    assert!(decrypt_field(&master, Field::OtpSecret, b"other", &blob).is_err());
}
