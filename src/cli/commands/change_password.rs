//! `epm change-password`: re-key the database under a new master password.
//!
//! Every confidential field and the verifier are re-encrypted in a single
//! transaction, so an interrupted run leaves the old password in force.

use crate::cli::output;
use crate::cli::{open_store, prompt_new_password, Cli, NEW_PASSWORD_ENV};
use crate::errors::Result;
use crate::store::PasswordManager;

/// Execute the `change-password` command.
pub fn execute(cli: &Cli) -> Result<()> {
    // 1. Open with the current password.
    output::info("Enter your current master password.");
    let store = open_store(cli)?;

    // 2. Prompt for the new password.
    output::info("Choose your new master password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    // 3. Re-encrypt everything.
    store.change_master_password(new_password.as_bytes())?;
    let count = store.count()?;
    store.close()?;

    output::success(&format!(
        "Master password changed ({count} entries re-encrypted)"
    ));

    Ok(())
}
