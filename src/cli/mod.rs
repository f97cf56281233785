//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{EpmError, Result};
use crate::store::PasswordStore;

/// Minimum master password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable holding the master password for scripted use.
pub const PASSWORD_ENV: &str = "EPM_PASSWORD";

/// Environment variable holding the replacement password for `change-password`.
pub const NEW_PASSWORD_ENV: &str = "EPM_NEW_PASSWORD";

/// EPM CLI: encrypted password manager.
#[derive(Parser)]
#[command(name = "epm", about = "Encrypted password manager", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Password database file (default: from .epm.toml, else passwords.db)
    #[arg(long, env = "EPM_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new password database
    Init,

    /// Add a credential (password is prompted, piped, or generated)
    Add {
        /// Website or service name
        website: String,
        /// Account username
        username: String,
        /// Generate the password instead of prompting for it
        #[arg(short, long)]
        generate: bool,
        /// Free-form note
        #[arg(long, default_value = "")]
        note: String,
        /// Base32 TOTP secret
        #[arg(long)]
        otp_secret: Option<String>,
        /// Backup code (repeat for several)
        #[arg(long = "backup-code")]
        backup_codes: Vec<String>,
    },

    /// Edit a credential; fields not given are kept
    Edit {
        /// Record id
        id: i64,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        note: Option<String>,
        /// Prompt for a new password
        #[arg(long, conflicts_with = "generate")]
        password: bool,
        /// Replace the password with a generated one
        #[arg(short, long)]
        generate: bool,
        /// Set the base32 TOTP secret
        #[arg(long, conflicts_with = "clear_otp")]
        otp_secret: Option<String>,
        /// Remove the TOTP secret
        #[arg(long)]
        clear_otp: bool,
        /// Replace all backup codes (repeat for several)
        #[arg(long = "backup-code", conflicts_with = "clear_backup_codes")]
        backup_codes: Vec<String>,
        /// Remove all backup codes
        #[arg(long)]
        clear_backup_codes: bool,
    },

    /// List all credentials
    List {
        /// Show passwords in clear text
        #[arg(long)]
        show_passwords: bool,
    },

    /// Print one field of a credential
    Show {
        /// Record id
        id: i64,
        /// Field to print
        #[arg(short, long, value_enum, default_value_t = ShowField::Password)]
        field: ShowField,
    },

    /// Delete a credential
    Delete {
        /// Record id
        id: i64,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a random password (no database needed)
    Generate {
        /// Password length (1-128)
        #[arg(short, long)]
        length: Option<usize>,
        /// Number of spaces to mix in
        #[arg(short, long)]
        spaces: Option<usize>,
        #[arg(long)]
        no_lower: bool,
        #[arg(long)]
        no_upper: bool,
        #[arg(long)]
        no_digits: bool,
        #[arg(long)]
        no_punctuation: bool,
    },

    /// Show the current TOTP code of a credential
    Totp {
        /// Record id
        id: i64,
    },

    /// Show a credential's backup codes, or use one up
    BackupCodes {
        /// Record id
        id: i64,
        /// Mark this code as used
        #[arg(long = "use")]
        use_code: Option<String>,
    },

    /// Change the master password
    ChangePassword,

    /// View the history of database operations
    History {
        /// Number of entries to show
        #[arg(long, default_value = "50")]
        last: usize,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Fields `epm show` can print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ShowField {
    Website,
    Username,
    Password,
    Note,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the master password from `EPM_PASSWORD` or an interactive prompt.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| EpmError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation.
///
/// Also respects the `env_var` environment variable for scripted usage.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(EpmError::CommandFailed(format!(
                    "master password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| EpmError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Master password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Read a credential password from stdin when piped, otherwise prompt.
pub fn read_credential_password(prompt: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string());
        if trimmed.is_empty() {
            return Err(EpmError::CommandFailed("empty password on stdin".into()));
        }
        return Ok(trimmed);
    }

    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| EpmError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Settings from `.epm.toml` in the current directory.
pub fn load_settings() -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    Settings::load(&cwd)
}

/// Resolve the database path: `--db` / `EPM_DB`, else `.epm.toml`.
pub fn database_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.db {
        return Ok(path.clone());
    }
    let cwd = std::env::current_dir()?;
    Ok(Settings::load(&cwd)?.database_path(&cwd))
}

/// Open the existing database for a command.
pub fn open_store(cli: &Cli) -> Result<PasswordStore> {
    let path = database_path(cli)?;
    if !path.exists() {
        return Err(EpmError::CommandFailed(format!(
            "no password database at {}; run `epm init` first",
            path.display()
        )));
    }

    let password = prompt_password()?;
    let store = PasswordStore::new();
    store.open(&path, password.as_bytes())?;
    Ok(store)
}
