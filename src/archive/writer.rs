//! Snapshot archive writer.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::infra::to_slash;

/// Outcome of writing a snapshot archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    entry_count: usize,
    size_bytes: u64,
    skipped: Vec<String>,
}

impl WriteSummary {
    /// Number of file entries written into the archive.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Size of the finished archive file in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Staged paths that no longer existed at write time.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

/// Writes a snapshot archive from a list of staged entries.
///
/// Each entry is resolved against `root`. A directory entry expands
/// recursively to all contained files with no ignore filtering:
/// explicitly staged content is written verbatim. An entry missing at
/// write time is skipped and reported, not fatal, since staging and
/// committing may be separated by user edits. A zero-entry archive is
/// still structurally valid.
pub fn write<P: AsRef<Path>, Q: AsRef<Path>>(
    root: P,
    archive_path: Q,
    entries: &[String],
) -> Result<WriteSummary> {
    let root = root.as_ref();
    let archive_path = archive_path.as_ref();

    if let Some(parent) = archive_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = ZipWriter::new(File::create(archive_path)?);
    let mut written: BTreeSet<String> = BTreeSet::new();
    let mut skipped = Vec::new();

    for entry in entries {
        let abs = root.join(entry);
        let meta = match fs::metadata(&abs) {
            Ok(m) => m,
            Err(_) => {
                warn!(path = %entry, "staged path missing at write time, skipping");
                skipped.push(entry.clone());
                continue;
            }
        };

        if meta.is_dir() {
            let mut files = Vec::new();
            collect_files(root, &abs, &mut files)?;
            for rel in files {
                add_file(&mut writer, root, &rel, &mut written, &mut skipped)?;
            }
        } else {
            add_file(&mut writer, root, entry, &mut written, &mut skipped)?;
        }
    }

    writer.finish()?;

    Ok(WriteSummary {
        entry_count: written.len(),
        size_bytes: fs::metadata(archive_path)?.len(),
        skipped,
    })
}

/// Serializes a complete directory tree into a snapshot archive.
///
/// Used by the patch engine to re-pack its scratch workspace. Every
/// regular file under `src_root` is written, keyed by its path
/// relative to `src_root`.
pub fn write_tree<P: AsRef<Path>, Q: AsRef<Path>>(
    src_root: P,
    archive_path: Q,
) -> Result<WriteSummary> {
    let src_root = src_root.as_ref();
    let archive_path = archive_path.as_ref();

    if let Some(parent) = archive_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut files = Vec::new();
    collect_files(src_root, src_root, &mut files)?;

    let mut writer = ZipWriter::new(File::create(archive_path)?);
    let mut written: BTreeSet<String> = BTreeSet::new();
    let mut skipped = Vec::new();
    for rel in files {
        add_file(&mut writer, src_root, &rel, &mut written, &mut skipped)?;
    }
    writer.finish()?;

    Ok(WriteSummary {
        entry_count: written.len(),
        size_bytes: fs::metadata(archive_path)?.len(),
        skipped,
    })
}

/// Adds one file to the archive, de-duplicating by relative path.
///
/// A file that cannot be opened is recorded in `skipped` so the
/// summary accounts for every resolved path.
fn add_file(
    writer: &mut ZipWriter<File>,
    root: &Path,
    rel: &str,
    written: &mut BTreeSet<String>,
    skipped: &mut Vec<String>,
) -> Result<()> {
    if written.contains(rel) {
        return Ok(());
    }

    let abs = root.join(rel);
    let mut file = match File::open(&abs) {
        Ok(f) => f,
        Err(_) => {
            warn!(path = %rel, "cannot open file for packing, skipping");
            skipped.push(rel.to_string());
            return Ok(());
        }
    };

    let options = file_options(&file.metadata()?);
    writer.start_file(rel, options)?;
    io::copy(&mut file, writer).map_err(Error::Io)?;
    written.insert(rel.to_string());

    Ok(())
}

/// Collects all regular files under `start`, relative to `root`, sorted.
fn collect_files(root: &Path, start: &Path, files: &mut Vec<String>) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(start)?.collect::<io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(root, &path, files)?;
        } else if file_type.is_file() {
            let rel = path
                .strip_prefix(root)
                .map_err(|_| Error::SourceNotFound(path.clone()))?;
            files.push(to_slash(rel));
        }
    }

    Ok(())
}

#[cfg(unix)]
fn file_options(meta: &fs::Metadata) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(meta.permissions().mode())
}

#[cfg(not(unix))]
fn file_options(_meta: &fs::Metadata) -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}
