use thiserror::Error;

/// Why a password generator request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("password length must be between {min} and {max} (got {length})")]
    InvalidLength {
        length: usize,
        min: usize,
        max: usize,
    },

    #[error("too many whitespaces: {requested} requested, at most {max} allowed")]
    TooManyWhitespaces { requested: usize, max: usize },

    #[error("at least one character class must be enabled")]
    NoCharacterClass,
}

/// All errors that can occur in EPM.
#[derive(Debug, Error)]
pub enum EpmError {
    // --- Generator errors ---
    #[error("Invalid generator configuration: {0}")]
    InvalidConfiguration(#[from] GeneratorError),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Authentication failed: wrong master password or corrupted data")]
    AuthenticationFailure,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Store errors ---
    #[error("Password store is not open")]
    NotOpen,

    #[error("Password store is already open")]
    AlreadyOpen,

    #[error("Record {0} not found")]
    NotFound(i64),

    #[error("Invalid store format: {0}")]
    InvalidStoreFormat(String),

    #[error("Storage error: {0}")]
    StorageIo(String),

    // --- OTP errors ---
    #[error("OTP secret is not valid base32")]
    InvalidOtpSecret,

    #[error("Record {0} has no OTP secret")]
    OtpSecretMissing(i64),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl From<std::io::Error> for EpmError {
    fn from(e: std::io::Error) -> Self {
        EpmError::StorageIo(e.to_string())
    }
}

impl From<rusqlite::Error> for EpmError {
    fn from(e: rusqlite::Error) -> Self {
        EpmError::StorageIo(e.to_string())
    }
}

/// Convenience type alias for EPM results.
pub type Result<T> = std::result::Result<T, EpmError>;
