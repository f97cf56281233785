//! High-level store operations used by the front end.
//!
//! `PasswordStore` is a small state machine: it starts Closed, `open`
//! derives the master key and checks it against the header's verifier,
//! and `close` (or drop) discards the session and wipes the key.  All
//! record operations go through the `PasswordManager` trait and fail
//! with `NotOpen` on a closed store.
//!
//! The session sits behind a mutex, so one store can be shared between
//! threads; every operation holds the lock for its whole duration and
//! every mutation is a single SQLite transaction.
//!
//! Every confidential blob is sealed with its record id as associated
//! data, so a blob copied into another row no longer authenticates.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rusqlite::types::FromSql;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::crypto::encryption::{decrypt_field, encrypt_field};
use crate::crypto::kdf::{derive_master_key_with_params, generate_salt, Argon2Params, KDF_ALGORITHM};
use crate::crypto::keys::{Field, MasterKey};
use crate::errors::{EpmError, Result};
use crate::otp::{self, TotpCode};

use super::audit::{self, AuditEntry};
use super::record::{Credential, CredentialEntry, StoredCredential};
use super::schema::{self, parse_timestamp, StoreHeader, CURRENT_VERSION, VERIFIER_PLAINTEXT};

/// The query/mutation contract the front end programs against.
pub trait PasswordManager {
    /// Number of records.
    fn count(&self) -> Result<usize>;

    /// Every record ordered by id, with the password decrypted for this
    /// call only.
    fn list(&self) -> Result<Vec<CredentialEntry>>;

    /// One fully decrypted record.
    fn fetch(&self, id: i64) -> Result<StoredCredential>;

    fn fetch_password(&self, id: i64) -> Result<String>;
    fn fetch_username(&self, id: i64) -> Result<String>;
    fn fetch_website(&self, id: i64) -> Result<String>;
    fn fetch_otp_secret(&self, id: i64) -> Result<Option<String>>;

    /// Remaining backup codes.  Reading does not consume them.
    fn fetch_backup_codes(&self, id: i64) -> Result<Vec<String>>;

    /// Store a new record and return its freshly assigned id.
    fn insert(&self, credential: &Credential) -> Result<i64>;

    /// Replace every field of an existing record.
    fn update(&self, id: i64, credential: &Credential) -> Result<()>;

    fn delete(&self, id: i64) -> Result<()>;

    /// Remove `code` from the record's backup codes.
    ///
    /// Returns `false` when no remaining code matches.
    fn consume_backup_code(&self, id: i64, code: &str) -> Result<bool>;

    /// TOTP code for the record's OTP secret at `unix_seconds`.
    fn current_totp(&self, id: i64, unix_seconds: u64) -> Result<TotpCode>;

    /// The `limit` most recent history entries, newest first.
    fn history(&self, limit: usize) -> Result<Vec<AuditEntry>>;
}

/// Associated data for the header's verifier blob.
const HEADER_AAD: &[u8] = b"epm-store-header";

/// Associated data binding a field blob to its record.
fn record_aad(id: i64) -> [u8; 8] {
    id.to_be_bytes()
}

/// An open store file together with the key that unlocks it.
struct Session {
    path: PathBuf,
    conn: Connection,
    header: StoreHeader,
    master_key: MasterKey,
}

/// Encrypted forms of a credential's confidential fields.
struct SealedFields {
    password: Vec<u8>,
    otp_secret: Option<Vec<u8>>,
    backup_codes: Option<Vec<u8>>,
}

/// SQLite-backed implementation of `PasswordManager`.
pub struct PasswordStore {
    /// Used only when `open` initializes a new file.
    kdf_params: Argon2Params,
    session: Mutex<Option<Session>>,
}

impl Default for PasswordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordStore {
    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// A closed store that creates new files with the default Argon2id
    /// parameters.
    pub fn new() -> Self {
        Self::with_kdf_params(Argon2Params::default())
    }

    /// A closed store that creates new files with `kdf_params`.
    ///
    /// Existing files are always opened with the parameters in their
    /// own header.
    pub fn with_kdf_params(kdf_params: Argon2Params) -> Self {
        Self {
            kdf_params,
            session: Mutex::new(None),
        }
    }

    /// Open the store file at `path`, creating and initializing it if it
    /// does not exist yet.
    ///
    /// A wrong master password fails with `AuthenticationFailure` and
    /// leaves the store closed.  An existing file without a store header
    /// is refused with `InvalidStoreFormat` and left untouched.
    pub fn open(&self, path: &Path, master_password: &[u8]) -> Result<()> {
        let mut guard = self.lock()?;
        if guard.is_some() {
            return Err(EpmError::AlreadyOpen);
        }

        match Session::open(path, master_password, &self.kdf_params) {
            Ok(session) => {
                debug!(path = %path.display(), "password store opened");
                *guard = Some(session);
                Ok(())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to open password store");
                Err(e)
            }
        }
    }

    /// Close the store, wiping the master key.
    pub fn close(&self) -> Result<()> {
        let session = self.lock()?.take().ok_or(EpmError::NotOpen)?;
        debug!(path = %session.path.display(), "password store closed");
        session.close()
    }

    /// Whether a session is open.  Unlike the record operations this
    /// still answers through a poisoned lock.
    pub fn is_open(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Path of the open store file.
    pub fn path(&self) -> Result<PathBuf> {
        self.with_session(|s| Ok(s.path.clone()))
    }

    /// Argon2id parameters recorded in the open store's header.
    pub fn kdf_params(&self) -> Result<Argon2Params> {
        self.with_session(|s| Ok(s.header.argon2_params))
    }

    /// Re-key the open store under `new_password`.
    ///
    /// Generates a new salt, derives a new master key with the store's
    /// Argon2id parameters and re-encrypts every confidential field and
    /// the verifier in one transaction.  On success the session keeps
    /// running under the new key.
    pub fn change_master_password(&self, new_password: &[u8]) -> Result<()> {
        self.with_session(|s| {
            let salt = generate_salt();
            let new_key = derive_key(new_password, &salt, &s.header.argon2_params)?;

            let mut rows = Vec::new();
            let tx = s.conn.transaction()?;
            {
                let mut stmt =
                    tx.prepare("SELECT id, password, otp_secret, backup_codes FROM passwords")?;
                let mapped = stmt.query_map([], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                        row.get::<_, Option<Vec<u8>>>(2)?,
                        row.get::<_, Option<Vec<u8>>>(3)?,
                    ))
                })?;
                for row in mapped {
                    rows.push(row?);
                }
            }

            let record_count = rows.len();
            for (id, password, otp_secret, backup_codes) in rows {
                let aad = record_aad(id);
                let rekey = |field, blob: &[u8]| reseal(&s.master_key, &new_key, field, &aad, blob);
                let password = rekey(Field::Password, &password)?;
                let otp_secret = otp_secret
                    .map(|blob| rekey(Field::OtpSecret, &blob))
                    .transpose()?;
                let backup_codes = backup_codes
                    .map(|blob| rekey(Field::BackupCodes, &blob))
                    .transpose()?;

                tx.execute(
                    "UPDATE passwords SET password = ?1, otp_secret = ?2, backup_codes = ?3
                     WHERE id = ?4",
                    params![password, otp_secret, backup_codes, id],
                )?;
            }

            let mut header = s.header.clone();
            header.salt = salt.to_vec();
            header.verifier =
                encrypt_field(&new_key, Field::Verifier, HEADER_AAD, VERIFIER_PLAINTEXT)?;
            schema::write_header(&tx, &header)?;

            let details = format!("{record_count} records re-encrypted");
            audit::record(&tx, audit::OP_CHANGE_PASSWORD, None, Some(&details))?;
            tx.commit()?;

            s.header = header;
            s.master_key = new_key;
            debug!(records = record_count, "master password changed");
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lock(&self) -> Result<MutexGuard<'_, Option<Session>>> {
        self.session
            .lock()
            .map_err(|_| EpmError::StorageIo("password store lock poisoned".into()))
    }

    /// Run `f` against the open session, or fail with `NotOpen`.
    fn with_session<T>(&self, f: impl FnOnce(&mut Session) -> Result<T>) -> Result<T> {
        let mut guard = self.lock()?;
        let session = guard.as_mut().ok_or(EpmError::NotOpen)?;
        f(session)
    }
}

impl PasswordManager for PasswordStore {
    fn count(&self) -> Result<usize> {
        self.with_session(|s| {
            let count: i64 = s
                .conn
                .query_row("SELECT COUNT(*) FROM passwords", [], |row| row.get(0))?;
            usize::try_from(count)
                .map_err(|_| EpmError::InvalidStoreFormat(format!("bad record count {count}")))
        })
    }

    fn list(&self) -> Result<Vec<CredentialEntry>> {
        self.with_session(|s| {
            let mut stmt = s.conn.prepare(
                "SELECT id, website, username, password, otp_secret IS NOT NULL,
                        has_backup_code, note
                 FROM passwords
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, bool>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?;

            let mut entries = Vec::new();
            for row in rows {
                let (id, website, username, blob, has_otp, has_backup_codes, note) = row?;
                entries.push(CredentialEntry {
                    id,
                    website,
                    username,
                    password: decrypt_field(
                        &s.master_key,
                        Field::Password,
                        &record_aad(id),
                        &blob,
                    )?,
                    has_otp,
                    has_backup_codes,
                    note,
                });
            }
            Ok(entries)
        })
    }

    fn fetch(&self, id: i64) -> Result<StoredCredential> {
        self.with_session(|s| {
            let (website, username, password, otp_secret, backup_codes, note, created, updated) = s
                .conn
                .query_row(
                    "SELECT website, username, password, otp_secret, backup_codes, note,
                            created_at, updated_at
                     FROM passwords WHERE id = ?1",
                    [id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, Vec<u8>>(2)?,
                            row.get::<_, Option<Vec<u8>>>(3)?,
                            row.get::<_, Option<Vec<u8>>>(4)?,
                            row.get::<_, String>(5)?,
                            row.get::<_, String>(6)?,
                            row.get::<_, String>(7)?,
                        ))
                    },
                )
                .optional()?
                .ok_or(EpmError::NotFound(id))?;

            let aad = record_aad(id);
            let credential = Credential {
                website,
                username,
                password: decrypt_field(&s.master_key, Field::Password, &aad, &password)?,
                otp_secret: otp_secret
                    .map(|blob| decrypt_field(&s.master_key, Field::OtpSecret, &aad, &blob))
                    .transpose()?,
                backup_codes: open_backup_codes(&s.master_key, id, backup_codes.as_deref())?,
                note,
            };

            Ok(StoredCredential {
                id,
                credential,
                created_at: parse_timestamp(&created)?,
                updated_at: parse_timestamp(&updated)?,
            })
        })
    }

    fn fetch_password(&self, id: i64) -> Result<String> {
        self.with_session(|s| {
            let blob: Vec<u8> = s.by_id(id, "SELECT password FROM passwords WHERE id = ?1")?;
            decrypt_field(&s.master_key, Field::Password, &record_aad(id), &blob)
        })
    }

    fn fetch_username(&self, id: i64) -> Result<String> {
        self.with_session(|s| s.by_id(id, "SELECT username FROM passwords WHERE id = ?1"))
    }

    fn fetch_website(&self, id: i64) -> Result<String> {
        self.with_session(|s| s.by_id(id, "SELECT website FROM passwords WHERE id = ?1"))
    }

    fn fetch_otp_secret(&self, id: i64) -> Result<Option<String>> {
        self.with_session(|s| {
            let blob: Option<Vec<u8>> =
                s.by_id(id, "SELECT otp_secret FROM passwords WHERE id = ?1")?;
            blob.map(|b| decrypt_field(&s.master_key, Field::OtpSecret, &record_aad(id), &b))
                .transpose()
        })
    }

    fn fetch_backup_codes(&self, id: i64) -> Result<Vec<String>> {
        self.with_session(|s| {
            let blob: Option<Vec<u8>> =
                s.by_id(id, "SELECT backup_codes FROM passwords WHERE id = ?1")?;
            open_backup_codes(&s.master_key, id, blob.as_deref())
        })
    }

    fn insert(&self, credential: &Credential) -> Result<i64> {
        validate(credential)?;

        self.with_session(|s| {
            let now = Utc::now().to_rfc3339();

            // The row goes in first: its id is the associated data of
            // every blob, so the fields are sealed once it exists.
            let tx = s.conn.transaction()?;
            tx.execute(
                "INSERT INTO passwords (website, username, password, note, created_at, updated_at)
                 VALUES (?1, ?2, X'', ?3, ?4, ?4)",
                params![credential.website, credential.username, credential.note, now],
            )?;
            let id = tx.last_insert_rowid();

            let sealed = SealedFields::seal(&s.master_key, id, credential)?;
            tx.execute(
                "UPDATE passwords
                 SET password = ?1, otp_secret = ?2, backup_codes = ?3, has_backup_code = ?4
                 WHERE id = ?5",
                params![
                    sealed.password,
                    sealed.otp_secret,
                    sealed.backup_codes,
                    sealed.backup_codes.is_some(),
                    id,
                ],
            )?;
            audit::record(&tx, audit::OP_INSERT, Some(id), None)?;
            tx.commit()?;

            debug!(id, "credential inserted");
            Ok(id)
        })
    }

    fn update(&self, id: i64, credential: &Credential) -> Result<()> {
        validate(credential)?;

        self.with_session(|s| {
            let sealed = SealedFields::seal(&s.master_key, id, credential)?;
            let now = Utc::now().to_rfc3339();

            let tx = s.conn.transaction()?;
            let changed = tx.execute(
                "UPDATE passwords
                 SET website = ?1, username = ?2, password = ?3, otp_secret = ?4,
                     backup_codes = ?5, has_backup_code = ?6, note = ?7, updated_at = ?8
                 WHERE id = ?9",
                params![
                    credential.website,
                    credential.username,
                    sealed.password,
                    sealed.otp_secret,
                    sealed.backup_codes,
                    sealed.backup_codes.is_some(),
                    credential.note,
                    now,
                    id,
                ],
            )?;
            if changed == 0 {
                return Err(EpmError::NotFound(id));
            }
            audit::record(&tx, audit::OP_UPDATE, Some(id), None)?;
            tx.commit()?;

            debug!(id, "credential updated");
            Ok(())
        })
    }

    fn delete(&self, id: i64) -> Result<()> {
        self.with_session(|s| {
            let tx = s.conn.transaction()?;
            let changed = tx.execute("DELETE FROM passwords WHERE id = ?1", [id])?;
            if changed == 0 {
                return Err(EpmError::NotFound(id));
            }
            audit::record(&tx, audit::OP_DELETE, Some(id), None)?;
            tx.commit()?;

            debug!(id, "credential deleted");
            Ok(())
        })
    }

    fn consume_backup_code(&self, id: i64, code: &str) -> Result<bool> {
        self.with_session(|s| {
            let tx = s.conn.transaction()?;
            let blob: Option<Vec<u8>> = tx
                .query_row(
                    "SELECT backup_codes FROM passwords WHERE id = ?1",
                    [id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or(EpmError::NotFound(id))?;

            let mut codes = open_backup_codes(&s.master_key, id, blob.as_deref())?;
            let wanted = code.trim().as_bytes();
            let Some(index) = codes
                .iter()
                .position(|c| bool::from(c.as_bytes().ct_eq(wanted)))
            else {
                codes.zeroize();
                return Ok(false);
            };

            let mut used = codes.remove(index);
            used.zeroize();
            let remaining = codes.len();
            let sealed = seal_backup_codes(&s.master_key, id, &codes);
            codes.zeroize();
            let sealed = sealed?;

            tx.execute(
                "UPDATE passwords SET backup_codes = ?1, has_backup_code = ?2, updated_at = ?3
                 WHERE id = ?4",
                params![sealed, sealed.is_some(), Utc::now().to_rfc3339(), id],
            )?;
            let details = format!("{remaining} remaining");
            audit::record(&tx, audit::OP_CONSUME_BACKUP_CODE, Some(id), Some(&details))?;
            tx.commit()?;

            debug!(id, remaining, "backup code consumed");
            Ok(true)
        })
    }

    fn current_totp(&self, id: i64, unix_seconds: u64) -> Result<TotpCode> {
        let mut secret = self
            .fetch_otp_secret(id)?
            .ok_or(EpmError::OtpSecretMissing(id))?;
        let code = otp::generate_totp_at(&secret, unix_seconds);
        secret.zeroize();
        code
    }

    fn history(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        self.with_session(|s| audit::query(&s.conn, limit))
    }
}

impl Session {
    fn open(path: &Path, password: &[u8], kdf_params: &Argon2Params) -> Result<Self> {
        if path.exists() {
            Self::unlock_existing(path, password)
        } else {
            Self::create(path, password, kdf_params)
        }
    }

    /// Nothing is written to an existing file before the password checks out.
    fn unlock_existing(path: &Path, password: &[u8]) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        schema::configure(&conn)?;

        let header = schema::read_header(&conn)?.ok_or_else(|| {
            EpmError::InvalidStoreFormat(format!("{} is not a password store", path.display()))
        })?;
        let master_key = unlock(&header, password)?;

        Ok(Self {
            path: path.to_path_buf(),
            conn,
            header,
            master_key,
        })
    }

    /// The key is derived before the file exists, and a file whose
    /// initialization fails is removed again.
    fn create(path: &Path, password: &[u8], kdf_params: &Argon2Params) -> Result<Self> {
        let (header, master_key) = initialize(password, kdf_params)?;

        let conn = match create_file(path, &header) {
            Ok(conn) => conn,
            Err(e) => {
                remove_partial_file(path);
                return Err(e);
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            conn,
            header,
            master_key,
        })
    }

    fn close(self) -> Result<()> {
        let Session { conn, .. } = self;
        conn.close().map_err(|(_, e)| EpmError::from(e))
    }

    /// Run a single-column query keyed by record id.
    fn by_id<T: FromSql>(&self, id: i64, sql: &str) -> Result<T> {
        self.conn
            .query_row(sql, [id], |row| row.get(0))
            .optional()?
            .ok_or(EpmError::NotFound(id))
    }
}

impl SealedFields {
    fn seal(key: &MasterKey, id: i64, credential: &Credential) -> Result<Self> {
        let aad = record_aad(id);
        Ok(Self {
            password: encrypt_field(key, Field::Password, &aad, &credential.password)?,
            otp_secret: credential
                .otp_secret()
                .map(|secret| encrypt_field(key, Field::OtpSecret, &aad, secret))
                .transpose()?,
            backup_codes: seal_backup_codes(key, id, &credential.backup_codes)?,
        })
    }
}

/// Create a new store file with its tables, header and first history row,
/// all in one transaction.
fn create_file(path: &Path, header: &StoreHeader) -> Result<Connection> {
    let mut conn = Connection::open(path)?;
    restrict_permissions(path);
    schema::configure(&conn)?;

    let tx = conn.transaction()?;
    schema::create_tables(&tx)?;
    schema::write_header(&tx, header)?;
    audit::record(&tx, audit::OP_CREATE, None, None)?;
    tx.commit()?;

    Ok(conn)
}

fn remove_partial_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed partially created store"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not remove partially created store");
        }
    }
}

/// Derive a `MasterKey`, wiping the intermediate bytes.
fn derive_key(password: &[u8], salt: &[u8], params: &Argon2Params) -> Result<MasterKey> {
    let mut bytes = derive_master_key_with_params(password, salt, params)?;
    let key = MasterKey::new(bytes);
    bytes.zeroize();
    Ok(key)
}

/// Build the header and key for a brand-new store.
fn initialize(password: &[u8], kdf_params: &Argon2Params) -> Result<(StoreHeader, MasterKey)> {
    let salt = generate_salt();
    let master_key = derive_key(password, &salt, kdf_params)?;
    let verifier = encrypt_field(&master_key, Field::Verifier, HEADER_AAD, VERIFIER_PLAINTEXT)?;

    let header = StoreHeader {
        version: CURRENT_VERSION,
        salt: salt.to_vec(),
        kdf_algorithm: KDF_ALGORITHM.to_string(),
        argon2_params: *kdf_params,
        verifier,
        created_at: Utc::now(),
    };
    Ok((header, master_key))
}

/// Derive the key for an existing store and prove it against the verifier.
fn unlock(header: &StoreHeader, password: &[u8]) -> Result<MasterKey> {
    let key = derive_key(password, &header.salt, &header.argon2_params)?;

    let mut check = decrypt_field(&key, Field::Verifier, HEADER_AAD, &header.verifier)?;
    let matches: bool = check.as_bytes().ct_eq(VERIFIER_PLAINTEXT.as_bytes()).into();
    check.zeroize();

    if !matches {
        return Err(EpmError::AuthenticationFailure);
    }
    Ok(key)
}

/// Reject credentials whose OTP secret would never produce a code.
fn validate(credential: &Credential) -> Result<()> {
    if let Some(secret) = credential.otp_secret() {
        let mut key = otp::decode_secret(secret)?;
        key.zeroize();
    }
    Ok(())
}

/// Encrypt backup codes as one JSON array; no codes means no blob.
///
/// Codes are stored trimmed and blank ones are dropped, matching how
/// `consume_backup_code` compares its input.
fn seal_backup_codes(key: &MasterKey, id: i64, codes: &[String]) -> Result<Option<Vec<u8>>> {
    let trimmed: Vec<&str> = codes
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut json = serde_json::to_string(&trimmed)
        .map_err(|e| EpmError::SerializationError(format!("backup codes: {e}")))?;
    let blob = encrypt_field(key, Field::BackupCodes, &record_aad(id), &json);
    json.zeroize();
    blob.map(Some)
}

fn open_backup_codes(key: &MasterKey, id: i64, blob: Option<&[u8]>) -> Result<Vec<String>> {
    let Some(blob) = blob else {
        return Ok(Vec::new());
    };

    let mut json = decrypt_field(key, Field::BackupCodes, &record_aad(id), blob)?;
    let codes = serde_json::from_str(&json)
        .map_err(|e| EpmError::SerializationError(format!("backup codes: {e}")));
    json.zeroize();
    codes
}

fn reseal(
    old: &MasterKey,
    new: &MasterKey,
    field: Field,
    aad: &[u8],
    blob: &[u8],
) -> Result<Vec<u8>> {
    let mut plaintext = decrypt_field(old, field, aad, blob)?;
    let sealed = encrypt_field(new, field, aad, &plaintext);
    plaintext.zeroize();
    sealed
}

/// Owner-only permissions for a freshly created store file.
fn restrict_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        if let Err(e) = std::fs::set_permissions(path, perms) {
            warn!(path = %path.display(), error = %e, "could not restrict store permissions");
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::MIN_MEMORY_KIB;

    fn fast_store() -> PasswordStore {
        PasswordStore::with_kdf_params(Argon2Params {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PasswordStore>();
    }

    #[test]
    fn closed_store_rejects_everything() {
        let store = fast_store();
        assert!(!store.is_open());
        assert!(matches!(store.count(), Err(EpmError::NotOpen)));
        assert!(matches!(store.list(), Err(EpmError::NotOpen)));
        assert!(matches!(store.fetch_website(1), Err(EpmError::NotOpen)));
        assert!(matches!(
            store.insert(&Credential::new("a", "b", "c")),
            Err(EpmError::NotOpen)
        ));
        assert!(matches!(store.delete(1), Err(EpmError::NotOpen)));
        assert!(matches!(store.close(), Err(EpmError::NotOpen)));
    }

    #[test]
    fn open_twice_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.db");
        let store = fast_store();
        store.open(&path, b"pw").unwrap();
        assert!(matches!(store.open(&path, b"pw"), Err(EpmError::AlreadyOpen)));
        assert!(store.is_open());
    }

    #[test]
    fn invalid_otp_secret_is_rejected_before_writing() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = fast_store();
        store.open(&dir.path().join("store.db"), b"pw").unwrap();

        let bad = Credential::new("a", "b", "c").with_otp_secret("not base32!");
        assert!(matches!(store.insert(&bad), Err(EpmError::InvalidOtpSecret)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn new_store_records_its_creation() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = fast_store();
        store.open(&dir.path().join("store.db"), b"pw").unwrap();

        let history = store.history(10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].operation, audit::OP_CREATE);
    }

    #[test]
    fn poisoned_lock_fails_operations_but_not_is_open() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = fast_store();
        store.open(&dir.path().join("store.db"), b"pw").unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.session.lock().unwrap();
            panic!("poison the session lock");
        }));
        assert!(result.is_err());

        assert!(store.is_open());
        assert!(matches!(store.count(), Err(EpmError::StorageIo(_))));
    }

    #[test]
    fn kdf_params_come_from_the_header() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.db");
        fast_store().open(&path, b"pw").unwrap();

        // A store configured with other params still opens the file with
        // the params it was created with.
        let other = PasswordStore::with_kdf_params(Argon2Params {
            memory_kib: MIN_MEMORY_KIB * 2,
            iterations: 2,
            parallelism: 1,
        });
        other.open(&path, b"pw").unwrap();
        assert_eq!(other.kdf_params().unwrap().memory_kib, MIN_MEMORY_KIB);
    }
}
