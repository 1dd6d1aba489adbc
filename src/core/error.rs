//! Error taxonomy for the sync core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to look a secret up in a store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("keyring: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("secret store unavailable: {0}")]
    Backend(String),
}

/// Failure to load, validate or write `envsync.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("write config {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid key name '{0}' (expected [A-Za-z_][A-Za-z0-9_]*)")]
    InvalidKey(String),

    #[error("key '{0}' is listed more than once")]
    DuplicateKey(String),
}

/// Why a sync run did not complete.
///
/// `NotFound`, `Backup`, `Read`, `Store`, `NoSecretsFound` and
/// `UnsupportedValue` are raised before the env file is touched.
/// `RolledBack` means the env file was restored from the backup;
/// `RestoreFailed` means it may be partially written and the backup is the
/// only good copy.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("env file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("create backup {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("look up '{key}' in secret store: {source}")]
    Store {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("no secrets found in store '{service}' for: {}", .keys.join(", "))]
    NoSecretsFound { service: String, keys: Vec<String> },

    #[error("secret for '{key}' contains a double quote or line break and cannot be written on one quoted line")]
    UnsupportedValue { key: String },

    #[error("update {} failed ({source}); restored from {}", .path.display(), .backup.display())]
    RolledBack {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "update {} failed ({source}) and restore failed ({restore}); recover manually from {}",
        .path.display(),
        .backup.display()
    )]
    RestoreFailed {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
        restore: io::Error,
    },
}

impl SyncError {
    /// Whether the env file may differ from its pre-run content.
    pub fn env_file_modified(&self) -> bool {
        matches!(self, SyncError::RestoreFailed { .. })
    }
}
