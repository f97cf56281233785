//! `epm history`: show the operations recorded in the database.
//!
//! Usage:
//!   epm history              # show last 50 entries
//!   epm history --last 20    # show last 20

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;
use crate::store::PasswordManager;

/// Execute the `history` command.
pub fn execute(cli: &Cli, last: usize) -> Result<()> {
    let store = open_store(cli)?;
    let entries = store.history(last)?;

    if entries.is_empty() {
        output::info("No history entries found.");
        return Ok(());
    }

    output::print_history_table(&entries);

    Ok(())
}
