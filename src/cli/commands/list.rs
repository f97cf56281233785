//! `epm list`: show every credential in a table.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;
use crate::store::PasswordManager;

/// Execute the `list` command.
pub fn execute(cli: &Cli, show_passwords: bool) -> Result<()> {
    let store = open_store(cli)?;
    let entries = store.list()?;

    output::print_credentials_table(&entries, show_passwords);
    if !entries.is_empty() && !show_passwords {
        output::tip("Run `epm show <ID>` to print a password.");
    }

    Ok(())
}
