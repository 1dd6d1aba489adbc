//! Byte-for-byte backup and restore of the env file.

use crate::constants;
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Backup path for an env file: same directory, `.backup` appended to the
/// file name (`.env` -> `.env.backup`).
pub fn backup_path(env_file: &Path) -> PathBuf {
    let mut name = env_file
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(constants::BACKUP_SUFFIX);
    env_file.with_file_name(name)
}

/// Copy `source` to `backup`, flush it to disk, and verify the copy.
pub fn create(source: &Path, backup: &Path) -> io::Result<()> {
    copy_verified(source, backup)?;
    debug!(backup = %backup.display(), "backup created");
    Ok(())
}

/// Overwrite `target` with the content of `backup` and verify the result.
pub fn restore(backup: &Path, target: &Path) -> io::Result<()> {
    if !backup.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("backup not found: {}", backup.display()),
        ));
    }
    copy_verified(backup, target)?;
    debug!(target = %target.display(), "restored from backup");
    Ok(())
}

pub fn remove(backup: &Path) -> io::Result<()> {
    match fs::remove_file(backup) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Whether both files exist and hold identical bytes.
pub fn same_content(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(digest(a)? == digest(b)?)
}

fn copy_verified(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    File::options().write(true).open(to)?.sync_all()?;
    if !same_content(from, to)? {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} does not match {} after copy", to.display(), from.display()),
        ));
    }
    Ok(())
}

fn digest(path: &Path) -> io::Result<[u8; 32]> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().into())
}
