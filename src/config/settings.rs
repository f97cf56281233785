//! Project-level configuration loaded from `.epm.toml`.
//!
//! Every field is optional; anything missing falls back to a default.
//!
//! ```toml
//! database_path = "passwords.db"
//! argon2_memory_kib = 65536
//! argon2_iterations = 3
//! argon2_parallelism = 4
//! generator_length = 32
//! generator_whitespaces = 0
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::crypto::kdf::Argon2Params;
use crate::errors::{EpmError, Result};
use crate::generator::{GeneratorOptions, DEFAULT_LENGTH};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Store file, relative to the directory the config was loaded from.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Argon2id memory cost (KiB) for newly created stores.
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2id iterations for newly created stores.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2id lanes for newly created stores.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Default length for `epm generate`.
    #[serde(default = "default_generator_length")]
    pub generator_length: usize,

    /// Default number of spaces for `epm generate`.
    #[serde(default)]
    pub generator_whitespaces: usize,
}

// ── Default value functions ──────────────────────────────────────────

fn default_database_path() -> String {
    "passwords.db".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_generator_length() -> usize {
    DEFAULT_LENGTH
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            generator_length: default_generator_length(),
            generator_whitespaces: 0,
        }
    }
}

impl Settings {
    /// Name of the config file we look for.
    pub const FILE_NAME: &'static str = ".epm.toml";

    /// Load settings from `<dir>/.epm.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            EpmError::ConfigError(format!("Failed to read {}: {e}", config_path.display()))
        })?;

        toml::from_str(&contents).map_err(|e| {
            EpmError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })
    }

    /// Resolve the store path against `dir`.
    pub fn database_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.database_path)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Generator options seeded from the configured defaults.
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            length: self.generator_length,
            whitespaces: self.generator_whitespaces,
            ..GeneratorOptions::default()
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.database_path, "passwords.db");
        assert_eq!(s.argon2_params(), Argon2Params::default());
        assert_eq!(s.generator_length, 32);
        assert_eq!(s.generator_whitespaces, 0);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.database_path, "passwords.db");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
database_path = "vault/main.db"
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
generator_length = 20
generator_whitespaces = 2
"#;
        fs::write(tmp.path().join(".epm.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.database_path, "vault/main.db");
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 5);
        assert_eq!(settings.argon2_parallelism, 8);

        let options = settings.generator_options();
        assert_eq!(options.length, 20);
        assert_eq!(options.whitespaces, 2);
        assert!(options.use_punctuation);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".epm.toml"), "generator_length = 64\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.generator_length, 64);
        assert_eq!(settings.database_path, "passwords.db");
        assert_eq!(settings.argon2_iterations, 3);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".epm.toml"), "not valid {{toml").unwrap();

        assert!(matches!(
            Settings::load(tmp.path()),
            Err(EpmError::ConfigError(_))
        ));
    }

    #[test]
    fn load_errors_on_unknown_key() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".epm.toml"), "vault_dir = \"x\"\n").unwrap();
        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn database_path_is_relative_to_dir() {
        let s = Settings::default();
        let path = s.database_path(Path::new("/home/user"));
        assert_eq!(path, PathBuf::from("/home/user/passwords.db"));
    }
}
