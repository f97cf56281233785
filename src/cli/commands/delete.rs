//! `epm delete`: remove a credential.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::{EpmError, Result};
use crate::store::PasswordManager;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: i64, force: bool) -> Result<()> {
    let store = open_store(cli)?;
    let website = store.fetch_website(id)?;
    let username = store.fetch_username(id)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete #{id} ({username} at {website})?"))
            .default(false)
            .interact()
            .map_err(|e| EpmError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    store.delete(id)?;
    store.close()?;
    output::success(&format!("Deleted #{id} ({username} at {website})"));

    Ok(())
}
