//! `epm add`: store a new credential.

use crate::cli::output;
use crate::cli::{load_settings, open_store, read_credential_password, Cli};
use crate::errors::Result;
use crate::generator::generate_password;
use crate::store::{Credential, PasswordManager};

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    website: &str,
    username: &str,
    generate: bool,
    note: &str,
    otp_secret: Option<&str>,
    backup_codes: &[String],
) -> Result<()> {
    // Read the credential password before unlocking the store.
    let password = if generate {
        zeroize::Zeroizing::new(generate_password(&load_settings()?.generator_options())?)
    } else {
        read_credential_password(&format!("Password for {username} at {website}"))?
    };

    let mut credential = Credential::new(website, username, password.as_str())
        .with_note(note)
        .with_backup_codes(backup_codes.iter().cloned());
    if let Some(secret) = otp_secret {
        credential = credential.with_otp_secret(secret);
    }

    let store = open_store(cli)?;
    let id = store.insert(&credential)?;
    let total = store.count()?;
    store.close()?;

    output::success(&format!(
        "Added {username} at {website} as #{id} ({total} total)"
    ));
    if generate {
        output::tip(&format!("Run `epm show {id}` to print the generated password."));
    }

    Ok(())
}
