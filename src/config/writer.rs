use super::ConfigDocument;
use crate::MigrationError;
use chrono::Local;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// A fully written temporary file waiting to be renamed over its target.
///
/// Dropping it without calling [`StagedWrite::commit`] removes the temporary
/// file and leaves the target untouched.
#[derive(Debug)]
pub struct StagedWrite {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedWrite {
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the staged file over the target.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::WriteError`] if the rename fails; the target is
    /// unchanged in that case.
    pub fn commit(self) -> Result<(), MigrationError> {
        let Self { temp, target } = self;
        temp.persist(&target).map_err(|e| MigrationError::WriteError {
            path: target.clone(),
            detail: format!("failed to replace file: {}", e.error),
        })?;
        debug!("Replaced {}", target.display());
        Ok(())
    }
}

/// Write a config document to a sibling temporary file without touching the target
///
/// # Errors
///
/// Returns [`MigrationError::WriteError`] if:
/// - Unable to create parent directories
/// - Unable to create or write the temporary file
/// - Unable to serialize the document
pub fn stage_document<P: AsRef<Path>>(
    path: P,
    server_key: &str,
    document: &ConfigDocument,
) -> Result<StagedWrite, MigrationError> {
    let path_ref = path.as_ref();
    let write_error = |detail: String| MigrationError::WriteError {
        path: path_ref.to_path_buf(),
        detail,
    };

    let parent = match path_ref.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .map_err(|e| write_error(format!("failed to create {}: {e}", parent.display())))?;

    let mut json = serde_json::to_string_pretty(&document.to_value(server_key))
        .map_err(|e| write_error(format!("failed to serialize document: {e}")))?;
    json.push('\n');

    let prefix = path_ref
        .file_name()
        .map_or_else(|| ".mcp-ferry".to_string(), |name| format!(".{}", name.to_string_lossy()));
    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| write_error(format!("failed to create temporary file: {e}")))?;

    temp.write_all(json.as_bytes())
        .and_then(|()| temp.flush())
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| write_error(format!("failed to write temporary file: {e}")))?;

    // Keep the permissions of the file being replaced.
    if let Ok(metadata) = fs::metadata(path_ref) {
        fs::set_permissions(temp.path(), metadata.permissions())
            .map_err(|e| write_error(format!("failed to copy permissions: {e}")))?;
    }

    debug!("Staged {} byte(s) for {}", json.len(), path_ref.display());
    Ok(StagedWrite { temp, target: path_ref.to_path_buf() })
}

/// Write a config document atomically (temporary file, then rename)
///
/// # Errors
///
/// Returns [`MigrationError::WriteError`] if staging or the final rename fails.
/// The target file is left unmodified in either case.
pub fn write_document<P: AsRef<Path>>(
    path: P,
    server_key: &str,
    document: &ConfigDocument,
) -> Result<(), MigrationError> {
    stage_document(path, server_key, document)?.commit()
}

/// Create a timestamped backup of a file next to it
///
/// Returns `None` without touching the filesystem further when backups are
/// disabled or the file does not exist. Existing backups are never overwritten:
/// a second backup within the same second gets a `-1`, `-2`, ... suffix.
///
/// # Errors
///
/// Returns [`MigrationError::BackupFailed`] if the file cannot be read or the
/// copy cannot be completed.
pub fn backup_file<P: AsRef<Path>>(
    path: P,
    enabled: bool,
) -> Result<Option<PathBuf>, MigrationError> {
    if !enabled {
        return Ok(None);
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    backup_file_with_timestamp(path.as_ref(), &timestamp)
}

pub(crate) fn backup_file_with_timestamp(
    path: &Path,
    timestamp: &str,
) -> Result<Option<PathBuf>, MigrationError> {
    let backup_error = |detail: String| MigrationError::BackupFailed {
        path: path.to_path_buf(),
        detail,
    };

    let mut source = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(backup_error(format!("failed to open file: {e}"))),
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| backup_error("path has no file name".to_string()))?;

    // The backup never becomes more readable than the original, not even briefly.
    let permissions = source
        .metadata()
        .map_err(|e| backup_error(format!("failed to read metadata: {e}")))?
        .permissions();
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(permissions.mode() & 0o777);
    }

    for attempt in 0_u32.. {
        let mut backup_name = OsString::from(file_name);
        if attempt == 0 {
            backup_name.push(format!(".{timestamp}.bak"));
        } else {
            backup_name.push(format!(".{timestamp}-{attempt}.bak"));
        }
        let backup_path = path.with_file_name(backup_name);

        let mut backup = match options.open(&backup_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(backup_error(format!(
                    "failed to create {}: {e}",
                    backup_path.display()
                )));
            },
        };

        let copied = io::copy(&mut source, &mut backup)
            .and_then(|_| backup.set_permissions(permissions.clone()))
            .and_then(|()| backup.sync_all());
        if let Err(e) = copied {
            drop(backup);
            let _ = fs::remove_file(&backup_path);
            return Err(backup_error(format!("failed to copy to {}: {e}", backup_path.display())));
        }

        debug!("Backed up {} to {}", path.display(), backup_path.display());
        return Ok(Some(backup_path));
    }

    Err(backup_error("no free backup file name".to_string()))
}
