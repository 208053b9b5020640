//! Atomic file writes with permissions fixed at creation.

use std::fs;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use super::error::SetupError;

/// Write `content` to `path` via a temp file created with `mode`.
///
/// The temp file gets its permissions from `open(2)` itself, so the content is
/// never readable with looser permissions, and the rename leaves either the old
/// file or the complete new one.
pub fn write_file_atomic(path: &Path, content: &str, mode: u32) -> Result<(), SetupError> {
    let temp_path = path.with_extension("tmp");
    if temp_path.exists() {
        fs::remove_file(&temp_path)?;
    }

    {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(mode)
            .open(&temp_path)
            .map_err(|e| SetupError::System(format!("Failed to create temp file: {e}")))?;

        file.write_all(content.as_bytes())
            .map_err(|e| SetupError::System(format!("Failed to write temp file: {e}")))?;

        file.sync_all()
            .map_err(|e| SetupError::System(format!("Failed to sync temp file: {e}")))?;
    }

    fs::rename(&temp_path, path)
        .map_err(|e| SetupError::System(format!("Failed to rename temp file: {e}")))?;

    Ok(())
}

/// Owner read/write only
pub fn write_secret_file(path: &Path, content: &str) -> Result<(), SetupError> {
    write_file_atomic(path, content, 0o600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn secret_file_is_owner_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet-details.txt");

        write_secret_file(&path, "secret\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert_eq!(fs::read_to_string(&path).unwrap(), "secret\n");
    }

    #[test]
    fn overwrite_tightens_existing_world_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet_password.txt");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_secret_file(&path, "new").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!path.with_extension("tmp").exists());
    }
}
