//! Config and env file path resolution.

use crate::constants;
use crate::core::backup;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SyncPaths {
    pub config: PathBuf,
    pub env_file: PathBuf,
    pub backup: PathBuf,
}

impl SyncPaths {
    /// Locate the config file from CLI arg, env var, or auto-detection.
    /// Falls back to `envsync.toml` in the working directory, which need not
    /// exist.
    pub fn locate_config(config_arg: Option<PathBuf>) -> Result<PathBuf> {
        let cwd = env::current_dir().context("resolve current directory")?;
        Ok(pick_config(config_arg, env::var("ENVSYNC_CONFIG").ok(), &cwd))
    }

    /// Build paths for a config file. `env_file` overrides the configured
    /// env file and is taken relative to the working directory; `configured`
    /// is relative to the config file's directory.
    pub fn from_config(
        config: PathBuf,
        env_file: Option<PathBuf>,
        configured: Option<&Path>,
    ) -> Result<Self> {
        // Relative paths in the config resolve against its directory.
        let root = config
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let env_file = match (env_file, configured) {
            (Some(arg), _) => env::current_dir()
                .context("resolve current directory")?
                .join(arg),
            (None, Some(configured)) => root.join(configured),
            (None, None) => root.join(constants::DEFAULT_ENV_FILE),
        };
        let backup = backup::backup_path(&env_file);
        Ok(Self {
            config,
            env_file,
            backup,
        })
    }
}

/// An empty `ENVSYNC_CONFIG` counts as unset.
fn pick_config(config_arg: Option<PathBuf>, env_value: Option<String>, cwd: &Path) -> PathBuf {
    if let Some(path) = config_arg {
        return cwd.join(path);
    }
    if let Some(path) = env_value.filter(|v| !v.is_empty()) {
        return cwd.join(path);
    }
    find_config(cwd).unwrap_or_else(|| cwd.join(constants::CONFIG_FILE_NAME))
}

fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(constants::CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

impl std::fmt::Display for SyncPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.env_file.display())
    }
}
