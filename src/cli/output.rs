//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::store::{AuditEntry, CredentialEntry};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Table cell for a boolean flag.
pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Print the credential table (Id, Website, Username, Password, TOTP,
/// Backup Codes, Note).  Passwords are masked unless `show_passwords`.
pub fn print_credentials_table(entries: &[CredentialEntry], show_passwords: bool) {
    if entries.is_empty() {
        info("No passwords in this database yet.");
        tip("Run `epm add <WEBSITE> <USERNAME>` to add your first one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Id",
        "Website",
        "Username",
        "Password",
        "TOTP",
        "Backup Codes",
        "Note",
    ]);

    for e in entries {
        let password = if show_passwords {
            e.password.clone()
        } else {
            "\u{2022}".repeat(8)
        };
        table.add_row(vec![
            e.id.to_string(),
            e.website.clone(),
            e.username.clone(),
            password,
            yes_no(e.has_otp).to_string(),
            yes_no(e.has_backup_codes).to_string(),
            e.note.clone(),
        ]);
    }

    println!("{table}");
}

/// Print history entries in a formatted table.
pub fn print_history_table(entries: &[AuditEntry]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Record", "Details"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_operation(&entry.operation),
            entry
                .record_id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
            entry.details.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }

    println!(
        "{}",
        style(format!("{} history entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize operation names for display.
fn colorize_operation(op: &str) -> String {
    use crate::store::audit::*;

    match op {
        OP_CREATE | OP_INSERT => style(op).green().to_string(),
        OP_UPDATE | OP_CONSUME_BACKUP_CODE => style(op).blue().to_string(),
        OP_DELETE => style(op).red().to_string(),
        OP_CHANGE_PASSWORD => style(op).yellow().to_string(),
        _ => op.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_no_labels() {
        assert_eq!(yes_no(true), "Yes");
        assert_eq!(yes_no(false), "No");
    }

    #[test]
    fn colorize_operation_keeps_text() {
        console::set_colors_enabled(false);
        assert_eq!(colorize_operation("insert"), "insert");
        assert_eq!(colorize_operation("unknown"), "unknown");
    }
}
