//! `epm edit`: change fields of an existing credential.
//!
//! Only the fields named on the command line change; the record is then
//! written back as a whole.

use crate::cli::output;
use crate::cli::{load_settings, open_store, read_credential_password, Cli};
use crate::errors::Result;
use crate::generator::generate_password;
use crate::store::PasswordManager;

/// What `epm edit` was asked to change.
#[derive(Debug, Default)]
pub struct EditRequest<'a> {
    pub website: Option<&'a str>,
    pub username: Option<&'a str>,
    pub note: Option<&'a str>,
    pub prompt_password: bool,
    pub generate: bool,
    pub otp_secret: Option<&'a str>,
    pub clear_otp: bool,
    pub backup_codes: &'a [String],
    pub clear_backup_codes: bool,
}

impl EditRequest<'_> {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.website.is_none()
            && self.username.is_none()
            && self.note.is_none()
            && !self.prompt_password
            && !self.generate
            && self.otp_secret.is_none()
            && !self.clear_otp
            && self.backup_codes.is_empty()
            && !self.clear_backup_codes
    }
}

/// Execute the `edit` command.
pub fn execute(cli: &Cli, id: i64, request: &EditRequest<'_>) -> Result<()> {
    if request.is_empty() {
        output::info("Nothing to change.");
        output::tip("Run `epm edit --help` to see the editable fields.");
        return Ok(());
    }

    let new_password = if request.generate {
        Some(zeroize::Zeroizing::new(generate_password(
            &load_settings()?.generator_options(),
        )?))
    } else if request.prompt_password {
        Some(read_credential_password("New password")?)
    } else {
        None
    };

    let store = open_store(cli)?;
    let mut credential = store.fetch(id)?.credential;

    if let Some(website) = request.website {
        credential.website = website.to_string();
    }
    if let Some(username) = request.username {
        credential.username = username.to_string();
    }
    if let Some(note) = request.note {
        credential.note = note.to_string();
    }
    if let Some(password) = &new_password {
        credential.password = password.as_str().to_string();
    }
    if request.clear_otp {
        credential.otp_secret = None;
    } else if let Some(secret) = request.otp_secret {
        credential.otp_secret = Some(secret.to_string());
    }
    if request.clear_backup_codes {
        credential.backup_codes.clear();
    } else if !request.backup_codes.is_empty() {
        credential.backup_codes = request.backup_codes.to_vec();
    }

    store.update(id, &credential)?;
    store.close()?;

    output::success(&format!(
        "Updated #{id} ({} at {})",
        credential.username, credential.website
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_is_empty() {
        assert!(EditRequest::default().is_empty());
    }

    #[test]
    fn any_field_makes_request_non_empty() {
        let request = EditRequest {
            note: Some("work"),
            ..EditRequest::default()
        };
        assert!(!request.is_empty());

        let codes = vec!["123".to_string()];
        let request = EditRequest {
            backup_codes: &codes,
            ..EditRequest::default()
        };
        assert!(!request.is_empty());
    }
}
