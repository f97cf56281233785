//! Configuration loaded from `.epm.toml`.

pub mod settings;

pub use settings::Settings;
