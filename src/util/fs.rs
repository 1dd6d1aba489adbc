use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub fn set_permissions(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        let perm = fs::Permissions::from_mode(mode);
        fs::set_permissions(path, perm)
            .with_context(|| format!("set permissions {:o} on {}", mode, path.display()))?;
    }
    Ok(())
}

/// Permission bits of `path`, or `None` where modes do not apply.
pub fn mode(path: &Path) -> Result<Option<u32>> {
    let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    #[cfg(unix)]
    {
        Ok(Some(meta.permissions().mode() & 0o777))
    }
    #[cfg(not(unix))]
    {
        let _ = meta;
        Ok(None)
    }
}

/// Whether group or others can read the file.
pub fn is_shared_readable(mode: u32) -> bool {
    mode & 0o044 != 0
}
