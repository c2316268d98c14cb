use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, trace};

use crate::error::ScanError;

/// Create a directory if it doesn't exist
pub fn ensure_dir_exists(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.as_os_str().is_empty() && !dir.exists() {
        debug!("Creating directory: {}", dir.display());
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    Ok(())
}

/// Read a source file fully; the handle is closed before returning
pub fn read_source(path: impl AsRef<Path>) -> Result<String, ScanError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    trace!("Read {} bytes from {}", content.len(), path.display());
    Ok(content)
}

/// Write a string to a file with better error handling
pub fn write_string_to_file(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_creates_parent_dirs() -> Result<()> {
        let dir = tempdir()?;
        let target = dir.path().join("out/nested/report.json");
        write_string_to_file(&target, "{}")?;
        assert_eq!(fs::read_to_string(&target)?, "{}");
        Ok(())
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read_source(dir.path().join("gone.py")).unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
    }

    #[test]
    fn test_read_non_utf8_is_io_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("latin1.py");
        fs::write(&path, [0x63u8, 0x6c, 0xe9, 0xff])?;
        assert!(matches!(read_source(&path), Err(ScanError::Io { .. })));
        Ok(())
    }
}
