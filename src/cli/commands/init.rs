//! `epm init`: create a new, empty password database.

use std::fs;

use crate::cli::output;
use crate::cli::{database_path, load_settings, prompt_new_password, Cli, PASSWORD_ENV};
use crate::errors::{EpmError, Result};
use crate::store::{PasswordManager, PasswordStore};

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let path = database_path(cli)?;

    // 1. Refuse to touch an existing database.
    if path.exists() {
        output::tip("Use `epm add` to add passwords to the existing database.");
        return Err(EpmError::CommandFailed(format!(
            "a password database already exists at {}",
            path.display()
        )));
    }

    // 2. Create the parent directory if it doesn't exist.
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            output::info(&format!("Created directory: {}", parent.display()));
        }
    }

    // 3. Prompt for a new password (with confirmation).
    let password = prompt_new_password(PASSWORD_ENV)?;

    // 4. Opening a missing file creates it with the configured KDF cost.
    let settings = load_settings()?;
    let store = PasswordStore::with_kdf_params(settings.argon2_params());
    store.open(&path, password.as_bytes())?;
    let count = store.count()?;
    store.close()?;

    output::success(&format!(
        "Password database created at {} ({count} entries)",
        path.display()
    ));
    output::tip("Run `epm add <WEBSITE> <USERNAME>` to add a password.");
    output::tip("Run `epm generate` to create a strong random password.");

    Ok(())
}
