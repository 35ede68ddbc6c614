//! File operations used by the sync engine.
//!
//! Writes are atomic: content goes to a temporary sibling, is synced to
//! disk, then renamed over the target. A failed write leaves the
//! original file untouched.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use crate::error::Result;

/// Write bytes to a file atomically.
///
/// This function:
/// 1. Writes content to `<name>.tmp` next to the target
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Read a file, treating "not found" as `None`.
///
/// # Errors
///
/// Returns an error for read failures other than a missing file.
pub fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Remove a file or a whole directory tree.
///
/// # Errors
///
/// Returns an error if removal fails.
pub fn remove_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// True when `path` is a directory with no entries.
#[must_use]
pub fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fontinfo.plist");

        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!temp_dir.path().join("fontinfo.plist.tmp").exists());
    }

    #[test]
    fn test_atomic_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("glyphs").join("a.glif");

        atomic_write(&path, b"<glyph/>").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_read_if_exists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("x");
        assert!(read_if_exists(&path).unwrap().is_none());
        fs::write(&path, "y").unwrap();
        assert_eq!(read_if_exists(&path).unwrap().unwrap(), b"y");
    }

    #[test]
    fn test_remove_path_and_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        assert!(is_empty_dir(&sub));
        fs::write(sub.join("f"), "x").unwrap();
        assert!(!is_empty_dir(&sub));
        remove_path(&sub).unwrap();
        assert!(!sub.exists());
        assert!(!is_empty_dir(&sub));
    }
}
