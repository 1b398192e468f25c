//! Working-tree scanning.
//!
//! Produces the set of trackable files under a repository root as
//! sorted, slash-separated relative paths. Ignored directories are
//! pruned without descending, so their contents are never scanned
//! even when a nested file would not match a pattern on its own. The
//! reserved `.zipsnap` metadata subtree is always pruned.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{Error, Result};
use crate::ignore::IgnoreSet;
use crate::infra::{fingerprint_file, to_slash};
use crate::repository::is_meta_path;

/// Scans the full working tree for trackable files.
///
/// Returns relative paths of regular files, sorted lexicographically.
pub fn scan<P: AsRef<Path>>(root: P, ignore: &IgnoreSet) -> Result<Vec<String>> {
    let root = root.as_ref();
    let mut files = Vec::new();
    let mut ignored = Vec::new();

    walk(root, root, ignore, &mut files, &mut ignored)?;
    files.sort();

    Ok(files)
}

/// Scans the full working tree, partitioning tracked from ignored.
///
/// The ignored list records the paths at which ignore rules matched:
/// a pruned directory appears once, its contents not at all. Both
/// lists are sorted.
pub fn partition<P: AsRef<Path>>(
    root: P,
    ignore: &IgnoreSet,
) -> Result<(Vec<String>, Vec<String>)> {
    let root = root.as_ref();
    let mut files = Vec::new();
    let mut ignored = Vec::new();

    walk(root, root, ignore, &mut files, &mut ignored)?;
    files.sort();
    ignored.sort();

    Ok((files, ignored))
}

/// Scans a subdirectory of the working tree, given by relative path.
///
/// Applies the same pruning traversal as [`scan`], rooted at the
/// subdirectory. Returned paths are still relative to the repository
/// root.
pub fn scan_dir<P: AsRef<Path>>(root: P, rel_dir: &str, ignore: &IgnoreSet) -> Result<Vec<String>> {
    let root = root.as_ref();
    let start = root.join(rel_dir);
    let mut files = Vec::new();
    let mut ignored = Vec::new();

    walk(root, &start, ignore, &mut files, &mut ignored)?;
    files.sort();

    Ok(files)
}

/// Computes the fingerprint map of the live working tree.
///
/// Covers exactly the files [`scan`] would return. A file that
/// disappears between listing and hashing is skipped with a warning,
/// not treated as fatal.
pub fn fingerprints<P: AsRef<Path>>(
    root: P,
    ignore: &IgnoreSet,
) -> Result<BTreeMap<String, u32>> {
    let root = root.as_ref();
    let mut map = BTreeMap::new();

    for rel in scan(root, ignore)? {
        match fingerprint_file(root.join(&rel)) {
            Ok(crc) => {
                map.insert(rel, crc);
            }
            Err(e) => {
                warn!(path = %rel, error = %e, "skipping unreadable file");
            }
        }
    }

    Ok(map)
}

fn walk(
    root: &Path,
    current: &Path,
    ignore: &IgnoreSet,
    files: &mut Vec<String>,
    ignored: &mut Vec<String>,
) -> Result<()> {
    let entries = fs::read_dir(current).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::SourceNotFound(current.to_path_buf())
        } else {
            Error::Io(e)
        }
    })?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let rel = path
            .strip_prefix(root)
            .map_err(|_| Error::SourceNotFound(path.clone()))?;
        let rel_slash = to_slash(rel);

        // The metadata subtree is pruned regardless of patterns, at
        // whatever depth the walk reaches it
        if is_meta_path(&rel_slash) {
            continue;
        }

        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            if ignore.is_ignored(&rel_slash) {
                ignored.push(rel_slash);
                continue;
            }
            walk(root, &path, ignore, files, ignored)?;
        } else if file_type.is_file() {
            if ignore.is_ignored(&rel_slash) {
                ignored.push(rel_slash);
                continue;
            }
            files.push(rel_slash);
        }
        // Symlinks and other special files are skipped
    }

    Ok(())
}
