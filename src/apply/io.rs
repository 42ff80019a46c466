use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use fs2::FileExt;

use crate::error::SnapError;

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Exclusive advisory lock held for the duration of one file's flush.
#[derive(Debug)]
pub(crate) struct FlushFileLock {
    _file: File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AtomicWritePhase {
    TempWritten,
    TempSynced,
    Renamed,
}

pub(crate) fn acquire_flush_lock(path: &Path) -> Result<FlushFileLock, SnapError> {
    let file = OpenOptions::new()
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)
        .map_err(|error| SnapError::io(path, error))?;

    file.try_lock_exclusive().map_err(|error| {
        if error.kind() == std::io::ErrorKind::WouldBlock {
            SnapError::FileBusy {
                path: path.display().to_string(),
            }
        } else {
            SnapError::io(path, error)
        }
    })?;

    Ok(FlushFileLock { _file: file })
}

/// Replaces `path` with `contents` in one observable step: the text is
/// written and synced to an adjacent temporary file carrying the target's
/// permissions, then renamed over the target. Readers see either the old
/// text or the new text, never a partial write.
pub(crate) fn write_text_atomically(path: &Path, contents: &str) -> Result<(), SnapError> {
    write_text_atomically_inner(path, contents, |_| Ok(()))
}

#[cfg(test)]
pub(crate) fn write_text_atomically_with_hook<F>(
    path: &Path,
    contents: &str,
    phase_hook: F,
) -> Result<(), SnapError>
where
    F: FnMut(AtomicWritePhase) -> std::io::Result<()>,
{
    write_text_atomically_inner(path, contents, phase_hook)
}

fn write_text_atomically_inner<F>(
    path: &Path,
    contents: &str,
    mut phase_hook: F,
) -> Result<(), SnapError>
where
    F: FnMut(AtomicWritePhase) -> std::io::Result<()>,
{
    let target_permissions = fs::metadata(path)
        .map_err(|error| SnapError::io(path, error))?
        .permissions();
    let (temp_path, mut temp_file) = create_temp_file_adjacent(path)?;

    let result = (|| {
        temp_file
            .write_all(contents.as_bytes())
            .map_err(|error| SnapError::io(&temp_path, error))?;
        phase_hook(AtomicWritePhase::TempWritten).map_err(|error| SnapError::io(path, error))?;

        temp_file
            .sync_all()
            .map_err(|error| SnapError::io(&temp_path, error))?;
        phase_hook(AtomicWritePhase::TempSynced).map_err(|error| SnapError::io(path, error))?;

        fs::set_permissions(&temp_path, target_permissions.clone())
            .map_err(|error| SnapError::io(&temp_path, error))?;
        drop(temp_file);

        fs::rename(&temp_path, path).map_err(|error| SnapError::io(path, error))?;
        phase_hook(AtomicWritePhase::Renamed).map_err(|error| SnapError::io(path, error))?;

        sync_parent_directory(path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn create_temp_file_adjacent(path: &Path) -> Result<(PathBuf, File), SnapError> {
    let parent = resolve_parent_directory(path);
    let file_name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("snapedit-target");

    for _ in 0..64 {
        let counter = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos());
        let temp_name = format!(".{file_name}.snapedit-tmp-{nanos}-{counter}");
        let temp_path = parent.join(temp_name);

        match OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp_path)
        {
            Ok(file) => return Ok((temp_path, file)),
            Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(error) => return Err(SnapError::io(&temp_path, error)),
        }
    }

    Err(SnapError::io(
        path,
        std::io::Error::other("failed to allocate an adjacent temporary file"),
    ))
}

fn resolve_parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn sync_parent_directory(path: &Path) -> Result<(), SnapError> {
    #[cfg(unix)]
    {
        let parent = resolve_parent_directory(path);
        let directory_handle =
            File::open(&parent).map_err(|error| SnapError::io(&parent, error))?;
        directory_handle
            .sync_all()
            .map_err(|error| SnapError::io(&parent, error))
    }

    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}
