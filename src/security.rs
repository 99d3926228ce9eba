//! File permissions for rendered configuration
//!
//! The rendered file carries object storage credentials, so it is restricted
//! to its owner before it becomes visible under its final name.

use crate::error::{Error, Result};
use std::path::Path;

/// Set restrictive permissions on a file (Unix: 0o600 - owner read/write only)
///
/// On Windows, this is a no-op as Windows uses ACLs differently.
///
/// # Errors
///
/// * `Error::FileRead` - If the file metadata cannot be read
/// * `Error::FileWrite` - If the permissions cannot be changed
#[cfg(unix)]
pub fn set_secure_file_permissions(path: &Path) -> Result<()> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut perms = metadata.permissions();
    perms.set_mode(0o600);

    fs::set_permissions(path, perms).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// No-op on Windows (permissions managed via ACLs)
#[cfg(not(unix))]
pub fn set_secure_file_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Whether group or other users can read the file
///
/// Always false on non-Unix platforms.
pub fn is_readable_by_others(path: &Path) -> Result<bool> {
    let metadata = std::fs::metadata(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Ok(metadata.permissions().mode() & 0o044 != 0)
    }

    #[cfg(not(unix))]
    {
        let _ = metadata;
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_secure_file_permissions() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("custom.config.php");

        fs::write(&file_path, "<?php\n").unwrap();

        set_secure_file_permissions(&file_path).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = fs::metadata(&file_path).unwrap();
            let mode = metadata.permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
        assert!(!is_readable_by_others(&file_path).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_detects_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("custom.config.php");
        fs::write(&file_path, "<?php\n").unwrap();
        fs::set_permissions(&file_path, fs::Permissions::from_mode(0o644)).unwrap();

        assert!(is_readable_by_others(&file_path).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let result = set_secure_file_permissions(&dir.path().join("absent"));
        assert!(result.is_err());
    }
}
