//! Credential types exchanged with the store.
//!
//! All three types wipe their strings when dropped, and their `Debug`
//! output never shows a confidential field.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A credential as the caller supplies it to `insert` / `update`, and as
/// it comes back from `fetch`.  Carries no id: ids belong to the store.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    pub website: String,
    pub username: String,
    pub password: String,
    /// Base32 TOTP seed.
    pub otp_secret: Option<String>,
    pub backup_codes: Vec<String>,
    pub note: String,
}

impl Credential {
    pub fn new(
        website: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            website: website.into(),
            username: username.into(),
            password: password.into(),
            otp_secret: None,
            backup_codes: Vec::new(),
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_otp_secret(mut self, secret: impl Into<String>) -> Self {
        self.otp_secret = Some(secret.into());
        self
    }

    pub fn with_backup_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backup_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// The OTP secret, if one is set and not blank.
    pub fn otp_secret(&self) -> Option<&str> {
        self.otp_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn has_backup_codes(&self) -> bool {
        !self.backup_codes.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("website", &self.website)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("has_otp", &self.otp_secret().is_some())
            .field("backup_codes", &self.backup_codes.len())
            .field("note", &self.note)
            .finish()
    }
}

/// One row of `PasswordManager::list`.
///
/// The password is decrypted for this listing only; OTP secret and backup
/// codes are reported by presence.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CredentialEntry {
    pub id: i64,
    pub website: String,
    pub username: String,
    pub password: String,
    pub has_otp: bool,
    pub has_backup_codes: bool,
    pub note: String,
}

impl fmt::Debug for CredentialEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialEntry")
            .field("id", &self.id)
            .field("website", &self.website)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("has_otp", &self.has_otp)
            .field("has_backup_codes", &self.has_backup_codes)
            .field("note", &self.note)
            .finish()
    }
}

/// A fully decrypted record with its id and timestamps.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub id: i64,
    pub credential: Credential,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let c = Credential::new("example.com", "alice", "Tr0ub4dor&3")
            .with_otp_secret("JBSWY3DPEHPK3PXP")
            .with_backup_codes(["111-222", "333-444"]);
        let shown = format!("{c:?}");
        assert!(shown.contains("example.com"));
        assert!(!shown.contains("Tr0ub4dor&3"));
        assert!(!shown.contains("JBSWY3DPEHPK3PXP"));
        assert!(!shown.contains("111-222"));
    }

    #[test]
    fn blank_otp_secret_counts_as_absent() {
        let c = Credential::new("a", "b", "c").with_otp_secret("   ");
        assert!(c.otp_secret().is_none());
    }

    #[test]
    fn backup_code_flag_follows_codes() {
        let c = Credential::new("a", "b", "c");
        assert!(!c.has_backup_codes());
        assert!(c.with_backup_codes(["x"]).has_backup_codes());
    }
}
