//! One-time passwords: RFC 4226 (HOTP) and RFC 6238 (TOTP).
//!
//! Stored OTP secrets are base32 strings as printed by most sites'
//! "can't scan the QR code?" fallback.  Codes use HMAC-SHA1, 6 digits and
//! a 30 second period, which is what authenticator apps assume when an
//! `otpauth://` URI carries no parameters.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::errors::{EpmError, Result};

/// Number of digits in a generated code.
pub const DIGITS: u32 = 6;

/// Length of one TOTP time step in seconds.
pub const PERIOD: u64 = 30;

/// A TOTP code together with its remaining validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotpCode {
    pub code: String,
    pub remaining_seconds: u64,
    pub period: u64,
}

/// Decode a base32 secret.
///
/// Spaces, hyphens, lowercase letters and missing padding are tolerated.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>> {
    let cleaned: String = secret
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let unpadded = cleaned.trim_end_matches('=');

    if unpadded.is_empty() {
        return Err(EpmError::InvalidOtpSecret);
    }

    base32::decode(base32::Alphabet::Rfc4648 { padding: false }, unpadded)
        .filter(|key| !key.is_empty())
        .ok_or(EpmError::InvalidOtpSecret)
}

/// Compute an HOTP code for raw key bytes and a counter.
pub fn hotp(key: &[u8], counter: u64, digits: u32) -> Result<String> {
    let mut mac =
        Hmac::<Sha1>::new_from_slice(key).map_err(|_| EpmError::InvalidOtpSecret)?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // Dynamic truncation, RFC 4226 §5.3.
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = (u32::from(digest[offset] & 0x7f) << 24)
        | (u32::from(digest[offset + 1]) << 16)
        | (u32::from(digest[offset + 2]) << 8)
        | u32::from(digest[offset + 3]);

    let code = u64::from(binary) % 10u64.pow(digits);
    Ok(format!("{:0>width$}", code, width = digits as usize))
}

/// Generate the TOTP code for `secret` at an explicit unix timestamp.
pub fn generate_totp_at(secret: &str, unix_seconds: u64) -> Result<TotpCode> {
    let key = decode_secret(secret)?;
    let code = hotp(&key, unix_seconds / PERIOD, DIGITS)?;
    Ok(TotpCode {
        code,
        remaining_seconds: PERIOD - (unix_seconds % PERIOD),
        period: PERIOD,
    })
}

/// Generate the TOTP code for `secret` at the current system time.
pub fn generate_totp(secret: &str) -> Result<TotpCode> {
    generate_totp_at(secret, current_unix_time())
}

/// Seconds since the unix epoch, or zero if the clock is before it.
pub fn current_unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
