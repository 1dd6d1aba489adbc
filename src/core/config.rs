//! Loading, validating and writing `envsync.toml`.

use crate::constants;
use crate::core::error::ConfigError;
use crate::models::key_mapping::is_valid_key_name;
use crate::models::sync_config::SyncFile;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Load and validate a config file. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<SyncFile, ConfigError> {
    if !path.exists() {
        return Ok(SyncFile::default());
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: SyncFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&file)?;
    Ok(file)
}

pub fn validate(file: &SyncFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for key in &file.keys {
        if !is_valid_key_name(&key.env) {
            return Err(ConfigError::InvalidKey(key.env.clone()));
        }
        if !seen.insert(key.env.as_str()) {
            return Err(ConfigError::DuplicateKey(key.env.clone()));
        }
    }
    Ok(())
}

/// Write the config atomically with owner-only permissions.
pub fn save(path: &Path, file: &SyncFile) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(file)?;
    let write_err = |source: io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;

    #[cfg(unix)]
    {
        let perm = fs::Permissions::from_mode(constants::CONFIG_FILE_MODE);
        tmp.as_file().set_permissions(perm).map_err(write_err)?;
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::key_mapping::KeyMapping;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_default() {
        let dir = TempDir::new().unwrap();
        let file = load(&dir.path().join("envsync.toml")).unwrap();
        assert!(file.keys.is_empty());
        assert_eq!(file.service(), constants::DEFAULT_SERVICE);
    }

    #[test]
    fn test_save_and_load_builtin() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("envsync.toml");
        save(&path, &SyncFile::builtin()).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.keys, SyncFile::builtin().keys);
        assert_eq!(loaded.service(), "memex");
    }

    #[cfg(unix)]
    #[test]
    fn test_save_sets_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("envsync.toml");
        save(&path, &SyncFile::builtin()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, constants::CONFIG_FILE_MODE);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("envsync.toml");
        fs::write(&path, "[sync\nservice = ").unwrap();
        assert!(matches!(load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_bad_names() {
        let mut file = SyncFile::default();
        file.keys = vec![KeyMapping::new("A"), KeyMapping::new("A")];
        assert!(matches!(validate(&file), Err(ConfigError::DuplicateKey(k)) if k == "A"));
        file.keys = vec![KeyMapping::new("BAD-NAME")];
        assert!(matches!(validate(&file), Err(ConfigError::InvalidKey(_))));
    }
}
