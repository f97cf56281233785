//! `epm show`: print one field of a credential to stdout.

use crate::cli::{open_store, Cli, ShowField};
use crate::errors::Result;
use crate::store::PasswordManager;

/// Execute the `show` command.
pub fn execute(cli: &Cli, id: i64, field: ShowField) -> Result<()> {
    let store = open_store(cli)?;

    let value = zeroize::Zeroizing::new(match field {
        ShowField::Website => store.fetch_website(id)?,
        ShowField::Username => store.fetch_username(id)?,
        ShowField::Password => store.fetch_password(id)?,
        ShowField::Note => store.fetch(id)?.credential.note.clone(),
    });
    println!("{}", value.as_str());

    Ok(())
}
