//! `epm backup-codes`: list a credential's backup codes, or use one up.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::{EpmError, Result};
use crate::store::PasswordManager;

/// Execute the `backup-codes` command.
pub fn execute(cli: &Cli, id: i64, use_code: Option<&str>) -> Result<()> {
    let store = open_store(cli)?;

    if let Some(code) = use_code {
        if !store.consume_backup_code(id, code)? {
            return Err(EpmError::CommandFailed(format!(
                "no remaining backup code of #{id} matches"
            )));
        }
        let remaining = store.fetch_backup_codes(id)?.len();
        store.close()?;
        output::success(&format!("Backup code used ({remaining} remaining)"));
        return Ok(());
    }

    let codes = zeroize::Zeroizing::new(store.fetch_backup_codes(id)?);
    if codes.is_empty() {
        output::info(&format!("#{id} has no backup codes."));
        return Ok(());
    }
    for code in codes.iter() {
        println!("{code}");
    }

    Ok(())
}
