//! The patch engine.
//!
//! Amends an existing snapshot in place: the archive is unpacked into
//! a scratch workspace, the new content is overlaid, and the archive
//! is re-serialized in full under the same tag. The rewrite targets a
//! temporary file beside the original and becomes visible only
//! through an atomic rename after it verifies, so any failure leaves
//! the original archive and its record untouched.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::archive;
use crate::error::{Error, Result};
use crate::infra::{copy_dir, copy_file};
use crate::version::VersionIndex;

/// Outcome of a patch operation.
#[derive(Debug, Clone)]
pub struct PatchReport {
    tag: String,
    added_path: String,
    entry_count: usize,
    size_bytes: u64,
}

impl PatchReport {
    /// The tag that was amended.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The working-tree path that was overlaid into the snapshot.
    pub fn added_path(&self) -> &str {
        &self.added_path
    }

    /// File entries in the rewritten archive.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Size of the rewritten archive in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

/// Amends the snapshot for `tag` with a file or directory from the
/// working tree.
///
/// `add_path` must name a path inside the working tree; absolute
/// paths and `..` components are rejected as [`Error::SourceNotFound`]
/// before anything is read.
///
/// The scratch workspace is removed on every exit path. The version
/// record's `entry_count` and `size_bytes` are updated only after the
/// rewritten archive has replaced the original; tag, message,
/// timestamp, and author are preserved.
pub fn patch(root: &Path, index: &VersionIndex, tag: &str, add_path: &str) -> Result<PatchReport> {
    let mut record = index.load(tag)?;

    let rel = add_path.replace('\\', "/");
    let rel = rel.trim_end_matches('/').to_string();

    // Absolute or traversing specs would resolve outside the working
    // tree and overlay outside the snapshot's namespace
    if rel.is_empty() || rel.starts_with('/') || rel.split('/').any(|part| part == "..") {
        return Err(Error::SourceNotFound(PathBuf::from(add_path)));
    }

    let src = root.join(&rel);
    let src_meta = fs::metadata(&src).map_err(|_| Error::SourceNotFound(PathBuf::from(&rel)))?;

    let archive_path = root.join(record.archive_path());

    // Scratch workspace; dropped (and deleted) on every exit path
    let scratch = tempfile::Builder::new().prefix("zipsnap-patch-").tempdir()?;

    archive::extract(&archive_path, scratch.path(), None)?;

    if src_meta.is_dir() {
        copy_dir(&src, scratch.path().join(&rel))?;
    } else {
        copy_file(&src, scratch.path().join(&rel))?;
    }
    debug!(tag = %tag, path = %rel, "overlay applied to scratch workspace");

    let temp_archive = sibling_temp_path(&archive_path);
    let summary = match rewrite(scratch.path(), &temp_archive) {
        Ok(s) => s,
        Err(e) => {
            let _ = fs::remove_file(&temp_archive);
            return Err(e);
        }
    };

    // Only now does the new archive become visible
    fs::rename(&temp_archive, &archive_path)?;

    record.update_counts(summary.entry_count(), summary.size_bytes());
    index.save(&record)?;

    info!(
        tag = %tag,
        entries = summary.entry_count(),
        bytes = summary.size_bytes(),
        "patch complete"
    );

    Ok(PatchReport {
        tag: tag.to_string(),
        added_path: rel,
        entry_count: summary.entry_count(),
        size_bytes: summary.size_bytes(),
    })
}

/// Re-serializes the scratch tree and verifies the result opens with
/// the expected number of entries.
fn rewrite(scratch: &Path, temp_archive: &Path) -> Result<archive::WriteSummary> {
    let summary = archive::write_tree(scratch, temp_archive)?;

    let count = archive::entry_count(temp_archive)?;
    if count != summary.entry_count() {
        return Err(Error::Io(std::io::Error::other(format!(
            "rewritten archive has {} entries, expected {}",
            count,
            summary.entry_count()
        ))));
    }

    Ok(summary)
}

fn sibling_temp_path(archive_path: &Path) -> PathBuf {
    let file_name = archive_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string());
    archive_path.with_file_name(format!(".{}.tmp", file_name))
}
