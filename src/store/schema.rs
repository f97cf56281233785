//! SQLite layout of a password store file.
//!
//! ```text
//! store_header  single row: format version, salt, KDF name + params,
//!               verifier blob, created_at            (all cleartext)
//! passwords     id, website, username, note, has_backup_code,
//!               created_at, updated_at               (cleartext)
//!               password, otp_secret, backup_codes   (nonce || ciphertext || tag)
//! audit_log     id, timestamp, operation, record_id, details
//! ```
//!
//! `passwords.id` is `AUTOINCREMENT`, so SQLite never hands out the id of
//! a deleted row again.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::crypto::kdf::{Argon2Params, KDF_ALGORITHM};
use crate::errors::{EpmError, Result};

/// Current store format version.
pub const CURRENT_VERSION: u32 = 1;

/// Plaintext sealed into the header's verifier blob.
pub const VERIFIER_PLAINTEXT: &str = "epm-store-verifier-v1";

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS store_header (
    id              INTEGER PRIMARY KEY CHECK (id = 1),
    format_version  INTEGER NOT NULL,
    salt            BLOB    NOT NULL,
    kdf_algorithm   TEXT    NOT NULL,
    kdf_memory_kib  INTEGER NOT NULL,
    kdf_iterations  INTEGER NOT NULL,
    kdf_parallelism INTEGER NOT NULL,
    verifier        BLOB    NOT NULL,
    created_at      TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS passwords (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    website         TEXT    NOT NULL,
    username        TEXT    NOT NULL,
    password        BLOB    NOT NULL,
    otp_secret      BLOB,
    backup_codes    BLOB,
    has_backup_code INTEGER NOT NULL DEFAULT 0,
    note            TEXT    NOT NULL DEFAULT '',
    created_at      TEXT    NOT NULL,
    updated_at      TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS audit_log (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp   TEXT    NOT NULL,
    operation   TEXT    NOT NULL,
    record_id   INTEGER,
    details     TEXT
);
";

/// Cleartext metadata stored in `store_header`.
#[derive(Debug, Clone)]
pub struct StoreHeader {
    pub version: u32,
    pub salt: Vec<u8>,
    pub kdf_algorithm: String,
    pub argon2_params: Argon2Params,
    /// `VERIFIER_PLAINTEXT` encrypted under the verifier sub-key.
    pub verifier: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Apply per-connection settings.  Writes nothing to the file.
pub fn configure(conn: &Connection) -> Result<()> {
    // Every commit reaches the disk before `COMMIT` returns.
    conn.execute_batch("PRAGMA synchronous = FULL;")?;
    Ok(())
}

/// Create the store tables.  Run inside the transaction that also writes
/// the header, so a file never holds tables without a header.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLES)?;
    Ok(())
}

/// Read the header row, if there is one.
///
/// `None` means the database carries no store header at all.  Rejects
/// headers written by a format or KDF this build does not know.
pub fn read_header(conn: &Connection) -> Result<Option<StoreHeader>> {
    let has_table: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master
                        WHERE type = 'table' AND name = 'store_header')",
        [],
        |row| row.get(0),
    )?;
    if !has_table {
        return Ok(None);
    }

    let row = conn
        .query_row(
            "SELECT format_version, salt, kdf_algorithm, kdf_memory_kib,
                    kdf_iterations, kdf_parallelism, verifier, created_at
             FROM store_header WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, String>(2)?,
                    Argon2Params {
                        memory_kib: row.get(3)?,
                        iterations: row.get(4)?,
                        parallelism: row.get(5)?,
                    },
                    row.get::<_, Vec<u8>>(6)?,
                    row.get::<_, String>(7)?,
                ))
            },
        )
        .optional()?;

    let Some((version, salt, kdf_algorithm, argon2_params, verifier, created_at)) = row else {
        return Ok(None);
    };

    if version != CURRENT_VERSION {
        return Err(EpmError::InvalidStoreFormat(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }
    if kdf_algorithm != KDF_ALGORITHM {
        return Err(EpmError::InvalidStoreFormat(format!(
            "unsupported key derivation '{kdf_algorithm}'"
        )));
    }

    Ok(Some(StoreHeader {
        version,
        salt,
        kdf_algorithm,
        argon2_params,
        verifier,
        created_at: parse_timestamp(&created_at)?,
    }))
}

/// Insert or replace the header row.
pub fn write_header(conn: &Connection, header: &StoreHeader) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO store_header
            (id, format_version, salt, kdf_algorithm, kdf_memory_kib,
             kdf_iterations, kdf_parallelism, verifier, created_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            header.version,
            header.salt,
            header.kdf_algorithm,
            header.argon2_params.memory_kib,
            header.argon2_params.iterations,
            header.argon2_params.parallelism,
            header.verifier,
            header.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Parse an RFC 3339 timestamp column.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| EpmError::InvalidStoreFormat(format!("bad timestamp '{value}': {e}")))
}
