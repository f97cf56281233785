//! One module per `epm` subcommand, each exposing `execute`.

pub mod add;
pub mod backup_codes;
pub mod change_password;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod generate;
pub mod history;
pub mod init;
pub mod list;
pub mod show;
pub mod totp;
