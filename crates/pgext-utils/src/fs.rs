use std::{fs, path::Path};

use crate::error::{FileSystemError, FileSystemResult, FsAction};

/// Creates a directory structure if it doesn't exist.
///
/// # Errors
///
/// * [`FileSystemError::Io`] if the directory could not be created.
/// * [`FileSystemError::NotADirectory`] if the path exists but is not a directory.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|err| FileSystemError::io(FsAction::CreateDir, path, err))?;
    } else if !path.is_dir() {
        return Err(FileSystemError::NotADirectory(path.to_path_buf()));
    }

    Ok(())
}

/// Writes `contents` to `path`, creating parent directories first.
pub fn write_file<P: AsRef<Path>>(path: P, contents: &[u8]) -> FileSystemResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, contents).map_err(|err| FileSystemError::io(FsAction::Write, path, err))
}
