//! Store module: encrypted credential storage.
//!
//! This module provides:
//! - `Credential`, `CredentialEntry` and `StoredCredential` (`record`)
//! - The SQLite file layout and header (`schema`)
//! - The in-file operation history (`audit`)
//! - The `PasswordManager` trait and `PasswordStore` (`store`)

pub mod audit;
pub mod record;
pub mod schema;
#[allow(clippy::module_inception)]
pub mod store;

pub use audit::AuditEntry;
pub use record::{Credential, CredentialEntry, StoredCredential};
pub use schema::{StoreHeader, CURRENT_VERSION};
pub use store::{PasswordManager, PasswordStore};
