//! Sync configuration file model (`envsync.toml`).

use crate::constants;
use crate::models::key_mapping::KeyMapping;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncFile {
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub keys: Vec<KeyMapping>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSection {
    /// Service name the secrets are stored under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Env file, relative to the directory holding the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,

    /// What to do with the backup after a successful run.
    #[serde(default)]
    pub backup: BackupPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupPolicy {
    /// Leave the backup next to the env file.
    #[default]
    Keep,
    /// Delete the backup once the env file has been rewritten.
    Remove,
}

impl SyncFile {
    /// Config equivalent to running without any `envsync.toml`, written out
    /// explicitly so `config init` produces an editable starting point.
    pub fn builtin() -> Self {
        Self {
            sync: SyncSection {
                service: Some(constants::DEFAULT_SERVICE.to_string()),
                env_file: Some(PathBuf::from(constants::DEFAULT_ENV_FILE)),
                backup: BackupPolicy::Keep,
            },
            keys: default_keys(),
        }
    }

    pub fn service(&self) -> &str {
        self.sync
            .service
            .as_deref()
            .unwrap_or(constants::DEFAULT_SERVICE)
    }

    /// Recognized keys; the built-in set when the file lists none.
    pub fn recognized_keys(&self) -> Vec<KeyMapping> {
        if self.keys.is_empty() {
            default_keys()
        } else {
            self.keys.clone()
        }
    }
}

fn default_keys() -> Vec<KeyMapping> {
    constants::DEFAULT_KEYS
        .iter()
        .map(|(env, secret, prefix)| {
            KeyMapping::new(*env)
                .with_secret(*secret)
                .with_prefix(*prefix)
        })
        .collect()
}
