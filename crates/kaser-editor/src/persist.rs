//! Persistence Gate
//!
//! Saving always backs up the file currently on disk first; if that copy fails nothing is
//! written. The overlay is committed onto a working copy of the buffer, so a failed write
//! leaves both the session buffer and the overlay exactly as they were.

use crate::{EditOverlay, EditorError, LineBuffer, Result};
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Suffix appended to the file name to form the backup path.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";

/// How saves are performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    /// Appended to the file name to build the backup path (`notes.txt` → `notes.txt.bak`).
    pub backup_suffix: String,
    /// Write to a temporary file and rename it over the original instead of overwriting in
    /// place.
    pub atomic: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            atomic: true,
        }
    }
}

/// What a successful save did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Backup written before saving; `None` when the file did not exist yet.
    pub backup: Option<PathBuf>,
    /// Lines in the saved file.
    pub lines: usize,
    /// Bytes in the saved file.
    pub bytes: usize,
}

/// Backup path for `path`: the file name with `suffix` appended.
pub fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Copy the on-disk bytes of `path` to its backup path, overwriting an older backup.
///
/// Returns `Ok(None)` when `path` does not exist.
///
/// # Errors
///
/// [`EditorError::BackupFailed`] when the copy cannot be completed.
pub fn create_backup(path: &Path, suffix: &str) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let backup = backup_path(path, suffix);
    fs::copy(path, &backup).map_err(|source| EditorError::BackupFailed {
        path: path.to_path_buf(),
        backup: backup.clone(),
        source,
    })?;
    debug!(path = %path.display(), backup = %backup.display(), "backup written");
    Ok(Some(backup))
}

/// Back up, commit and write.
///
/// 1. Back up the existing file (abort on failure).
/// 2. Commit `overlay` onto a copy of `buffer`.
/// 3. Write the committed lines with their terminators.
/// 4. Install the committed buffer and clear `overlay`.
///
/// # Errors
///
/// [`EditorError::BackupFailed`], [`EditorError::Io`], or [`EditorError::OutOfRange`] when
/// the overlay cannot be committed. `buffer` and `overlay` are unchanged on error.
pub fn save(
    path: &Path,
    buffer: &mut LineBuffer,
    overlay: &mut EditOverlay,
    options: &SaveOptions,
) -> Result<SaveReport> {
    let backup = create_backup(path, &options.backup_suffix)?;

    let mut committed = buffer.clone();
    overlay.clone().commit(&mut committed)?;

    let mut bytes = Vec::new();
    committed
        .write_to(&mut bytes)
        .map_err(|err| EditorError::io("encode", path, err))?;

    let written = if options.atomic {
        write_atomic(path, &bytes)
    } else {
        fs::write(path, &bytes)
    };
    written.map_err(|err| EditorError::io("write", path, err))?;

    let report = SaveReport {
        backup,
        lines: committed.line_count(),
        bytes: bytes.len(),
    };
    *buffer = committed;
    overlay.clear();

    info!(
        path = %path.display(),
        lines = report.lines,
        bytes = report.bytes,
        backup = ?report.backup,
        atomic = options.atomic,
        "saved"
    );
    Ok(report)
}

/// Write through a temporary file renamed over the target.
///
/// Symlinks are resolved first so the rename replaces the file they point at, not the link.
/// A target that cannot be opened for writing fails here the same way an in-place write
/// would, and a file with several hard links is overwritten in place to keep them shared.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let target = match fs::canonicalize(path) {
        Ok(target) => target,
        Err(err) if err.kind() == io::ErrorKind::NotFound => path.to_path_buf(),
        Err(err) => return Err(err),
    };

    let metadata = match fs::metadata(&target) {
        Ok(metadata) => Some(metadata),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => return Err(err),
    };
    if let Some(metadata) = &metadata {
        fs::OpenOptions::new().write(true).open(&target)?;
        if shared_by_hard_links(metadata) {
            debug!(path = %target.display(), "file has other hard links, writing in place");
            return fs::write(&target, bytes);
        }
    }

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.as_file().sync_all()?;

    // The temp file is created private; keep whatever mode the original had.
    if let Some(metadata) = metadata {
        fs::set_permissions(temp.path(), metadata.permissions())?;
    }

    temp.persist(&target).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(unix)]
fn shared_by_hard_links(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    metadata.nlink() > 1
}

#[cfg(not(unix))]
fn shared_by_hard_links(_metadata: &fs::Metadata) -> bool {
    false
}
