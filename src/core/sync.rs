//! Credential sync: copy secrets from a store into an env file.
//!
//! A run takes a backup of the env file, resolves every recognized key in the
//! secret store, and rewrites the matching lines. A failure while rewriting
//! is answered by restoring the backup before the error is returned, so the
//! env file is either fully updated or byte-identical to what it was.

use crate::core::backup;
use crate::core::env_file;
use crate::core::error::SyncError;
use crate::core::secret_store::SecretStore;
use crate::models::key_mapping::KeyMapping;
use crate::models::sync_config::BackupPolicy;
use crate::util::redact;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

/// A recognized key and whatever the store returned for it.
pub struct Resolution {
    pub key: KeyMapping,
    pub value: Option<Zeroizing<String>>,
}

/// Value failed the configured prefix check. Non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatWarning {
    pub key: String,
    pub expected_prefix: String,
}

/// Outcome of a successful run. Holds key names only, never values.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub env_file: PathBuf,
    /// Keys whose lines were rewritten.
    pub updated: Vec<String>,
    /// Keys resolved in the store but with no line in the env file.
    pub not_in_file: Vec<String>,
    /// Keys the store had no value for.
    pub not_in_store: Vec<String>,
    pub warnings: Vec<FormatWarning>,
    pub backup: PathBuf,
    pub backup_retained: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanStatus {
    Update,
    Unchanged,
    NotInFile,
    NotInStore,
    /// Value cannot be written on one quoted line; sync would refuse it.
    Unsupported,
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PlanStatus::Update => "update",
            PlanStatus::Unchanged => "unchanged",
            PlanStatus::NotInFile => "not in file",
            PlanStatus::NotInStore => "not in store",
            PlanStatus::Unsupported => "unsupported value",
        };
        f.write_str(label)
    }
}

/// Dry-run view of one recognized key.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub key: String,
    pub store_key: String,
    pub status: PlanStatus,
    /// Masked preview of the store value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub format_warning: bool,
}

#[derive(Debug, Clone)]
pub struct CredentialSync {
    env_file: PathBuf,
    backup: PathBuf,
    service: String,
    keys: Vec<KeyMapping>,
    backup_policy: BackupPolicy,
}

impl CredentialSync {
    pub fn new(env_file: impl Into<PathBuf>, service: impl Into<String>, keys: Vec<KeyMapping>) -> Self {
        let env_file = env_file.into();
        let backup = backup::backup_path(&env_file);
        Self {
            env_file,
            backup,
            service: service.into(),
            keys,
            backup_policy: BackupPolicy::Keep,
        }
    }

    pub fn with_backup_policy(mut self, policy: BackupPolicy) -> Self {
        self.backup_policy = policy;
        self
    }

    pub fn env_file(&self) -> &Path {
        &self.env_file
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Look every recognized key up in the store. Empty values count as
    /// missing.
    pub fn resolve(&self, store: &dyn SecretStore) -> Result<Vec<Resolution>, SyncError> {
        let mut out = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            let value = store
                .get(&self.service, key.store_key())
                .map_err(|source| SyncError::Store {
                    key: key.store_key().to_string(),
                    source,
                })?
                .filter(|v| !v.is_empty());
            debug!(
                key = %key.env,
                store_key = %key.store_key(),
                backend = store.backend_name(),
                found = value.is_some(),
                "resolved"
            );
            out.push(Resolution {
                key: key.clone(),
                value,
            });
        }
        Ok(out)
    }

    /// Run the sync, writing through [`env_file::write_atomic`].
    pub fn run(&self, store: &dyn SecretStore) -> Result<SyncReport, SyncError> {
        self.run_with_writer(store, env_file::write_atomic)
    }

    /// Run the sync with a caller-supplied writer for the final content.
    ///
    /// The writer may fail after partially writing the file; the backup is
    /// restored over whatever it left behind.
    pub fn run_with_writer<W>(&self, store: &dyn SecretStore, write: W) -> Result<SyncReport, SyncError>
    where
        W: FnOnce(&Path, &[u8]) -> io::Result<()>,
    {
        if !self.env_file.is_file() {
            return Err(SyncError::NotFound(self.env_file.clone()));
        }

        backup::create(&self.env_file, &self.backup).map_err(|source| SyncError::Backup {
            path: self.backup.clone(),
            source,
        })?;
        info!(backup = %self.backup.display(), "created backup");

        let resolved = self.resolve(store)?;
        if resolved.iter().all(|r| r.value.is_none()) {
            return Err(SyncError::NoSecretsFound {
                service: self.service.clone(),
                keys: self.keys.iter().map(|k| k.store_key().to_string()).collect(),
            });
        }

        if let Some(r) = resolved
            .iter()
            .find(|r| r.value.as_deref().is_some_and(|v| !env_file::fits_quoted(v)))
        {
            return Err(SyncError::UnsupportedValue {
                key: r.key.env.clone(),
            });
        }

        let updated = match self.apply(&resolved, write) {
            Ok(updated) => updated,
            Err(source) => return Err(self.roll_back(source)),
        };

        let mut report = SyncReport {
            env_file: self.env_file.clone(),
            updated,
            not_in_file: Vec::new(),
            not_in_store: Vec::new(),
            warnings: Vec::new(),
            backup: self.backup.clone(),
            backup_retained: true,
        };

        for r in &resolved {
            match &r.value {
                None => report.not_in_store.push(r.key.env.clone()),
                Some(value) => {
                    if !report.updated.contains(&r.key.env) {
                        report.not_in_file.push(r.key.env.clone());
                    }
                    if !r.key.looks_valid(value) {
                        let expected = r.key.expect_prefix.clone().unwrap_or_default();
                        warn!(key = %r.key.env, expected_prefix = %expected, "value format may be invalid");
                        report.warnings.push(FormatWarning {
                            key: r.key.env.clone(),
                            expected_prefix: expected,
                        });
                    }
                }
            }
        }

        if self.backup_policy == BackupPolicy::Remove {
            match backup::remove(&self.backup) {
                Ok(()) => report.backup_retained = false,
                Err(e) => warn!(backup = %self.backup.display(), error = %e, "could not remove backup"),
            }
        }

        info!(updated = ?report.updated, "env file updated");
        Ok(report)
    }

    /// Dry run: what `run` would do for each key, without touching any file.
    pub fn plan(&self, store: &dyn SecretStore) -> Result<Vec<PlanEntry>, SyncError> {
        if !self.env_file.is_file() {
            return Err(SyncError::NotFound(self.env_file.clone()));
        }
        let content = env_file::read(&self.env_file).map_err(|source| SyncError::Read {
            path: self.env_file.clone(),
            source,
        })?;

        let resolved = self.resolve(store)?;
        let entries = resolved
            .iter()
            .map(|r| {
                let (status, preview, format_warning) = match &r.value {
                    None => (PlanStatus::NotInStore, None, false),
                    Some(value) => {
                        let status = if !env_file::fits_quoted(value) {
                            PlanStatus::Unsupported
                        } else if !env_file::has_key(&content, &r.key.env) {
                            PlanStatus::NotInFile
                        } else if env_file::is_current(&content, &r.key.env, value) {
                            PlanStatus::Unchanged
                        } else {
                            PlanStatus::Update
                        };
                        (status, Some(redact::mask_value(value)), !r.key.looks_valid(value))
                    }
                };
                PlanEntry {
                    key: r.key.env.clone(),
                    store_key: r.key.store_key().to_string(),
                    status,
                    preview,
                    format_warning,
                }
            })
            .collect();
        Ok(entries)
    }

    /// Read, rewrite and write back. Returns the keys that were replaced.
    fn apply<W>(&self, resolved: &[Resolution], write: W) -> io::Result<Vec<String>>
    where
        W: FnOnce(&Path, &[u8]) -> io::Result<()>,
    {
        let content = env_file::read(&self.env_file)?;
        let values: Vec<(&str, &str)> = resolved
            .iter()
            .filter_map(|r| r.value.as_ref().map(|v| (r.key.env.as_str(), v.as_str())))
            .collect();
        let rewrite = env_file::rewrite(&content, &values);
        let new_content = Zeroizing::new(rewrite.content);
        write(&self.env_file, new_content.as_bytes())?;
        Ok(rewrite.updated)
    }

    fn roll_back(&self, source: io::Error) -> SyncError {
        error!(env_file = %self.env_file.display(), error = %source, "update failed, restoring backup");
        match backup::restore(&self.backup, &self.env_file) {
            Ok(()) => SyncError::RolledBack {
                path: self.env_file.clone(),
                backup: self.backup.clone(),
                source,
            },
            Err(restore) => {
                error!(backup = %self.backup.display(), error = %restore, "restore failed");
                SyncError::RestoreFailed {
                    path: self.env_file.clone(),
                    backup: self.backup.clone(),
                    source,
                    restore,
                }
            }
        }
    }
}
