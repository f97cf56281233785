//! `epm totp`: print the current one-time code of a credential.

use console::style;

use crate::cli::{open_store, Cli};
use crate::errors::Result;
use crate::otp;
use crate::store::PasswordManager;

/// Execute the `totp` command.
pub fn execute(cli: &Cli, id: i64) -> Result<()> {
    let store = open_store(cli)?;
    let code = store.current_totp(id, otp::current_unix_time())?;

    println!("{}", style(&code.code).bold());
    eprintln!(
        "{}",
        style(format!(
            "valid for {}s of {}s",
            code.remaining_seconds, code.period
        ))
        .dim()
    );

    Ok(())
}
