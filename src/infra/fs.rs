//! Filesystem utilities for file reading, atomic writing, and copying.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::Result;

/// Writes data to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it
/// over the target path, so the file is either fully written or not
/// modified at all. Parent directories are created as needed.
pub fn write_file_atomic<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = {
        let mut temp = path.to_path_buf();
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "temp".to_string());
        temp.set_file_name(format!(".{}.tmp", file_name));
        temp
    };

    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
    }

    // Rename is atomic on most filesystems
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Copies a single file, creating the destination's parent directories.
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<()> {
    let dst = dst.as_ref();
    if let Some(parent) = dst.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::copy(src.as_ref(), dst)?;
    Ok(())
}

/// Recursively copies a directory tree.
///
/// Files at the destination are overwritten; directories are created
/// as encountered.
pub fn copy_dir<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(entry.path(), &target)?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }

    Ok(())
}

/// Converts a relative path to its forward-slash string form.
///
/// Relative paths are stored and compared in slash form everywhere
/// (stage file, archive entry names, fingerprint maps), regardless of
/// the platform separator.
pub fn to_slash<P: AsRef<Path>>(path: P) -> String {
    let mut out = String::new();
    for component in path.as_ref().components() {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    out
}
