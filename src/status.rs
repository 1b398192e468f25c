//! Working-tree status.
//!
//! Compares the live working tree with the latest snapshot, if one
//! exists. Both sides of the comparison are filtered through the
//! current ignore rules so the diff covers only trackable files.

use std::path::Path;

use crate::archive;
use crate::diff::{diff_maps, DiffSummary};
use crate::error::Result;
use crate::ignore::IgnoreSet;
use crate::version::VersionIndex;
use crate::worktree;

/// A structured view of the repository's current state.
#[derive(Debug, Clone)]
pub struct StatusReport {
    tracked: Vec<String>,
    ignored: Vec<String>,
    baseline: Option<String>,
    changes: Option<DiffSummary>,
}

impl StatusReport {
    /// Trackable files in the working tree, sorted.
    pub fn tracked(&self) -> &[String] {
        &self.tracked
    }

    /// Paths excluded by ignore rules (pruned directories listed once).
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Tag of the latest version the tree was compared against.
    pub fn baseline(&self) -> Option<&str> {
        self.baseline.as_deref()
    }

    /// Differences against the baseline, if one exists.
    pub fn changes(&self) -> Option<&DiffSummary> {
        self.changes.as_ref()
    }

    /// Returns true if a baseline exists and the tree matches it.
    pub fn is_clean(&self) -> bool {
        self.changes.as_ref().is_some_and(|c| c.is_empty())
    }
}

/// Computes the status of the working tree under `root`.
///
/// The baseline is the latest version by timestamp; with no versions
/// yet, `baseline` and `changes` are `None` and only the tracked and
/// ignored partitions are reported.
pub fn compute_status(
    root: &Path,
    ignore: &IgnoreSet,
    index: &VersionIndex,
) -> Result<StatusReport> {
    let (tracked, ignored) = worktree::partition(root, ignore)?;

    let (baseline, changes) = match index.latest()? {
        Some(record) => {
            let mut snapshot = archive::read_fingerprints(root.join(record.archive_path()))?;
            // Entries that have since become ignored drop out of the
            // comparison on both sides
            snapshot.retain(|path, _| !ignore.is_ignored(path));

            let live = worktree::fingerprints(root, ignore)?;
            let summary = diff_maps(&snapshot, &live);
            (Some(record.tag().to_string()), Some(summary))
        }
        None => (None, None),
    };

    Ok(StatusReport {
        tracked,
        ignored,
        baseline,
        changes,
    })
}
