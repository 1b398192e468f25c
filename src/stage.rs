//! The staging area.
//!
//! A persisted set of relative paths selected for the next snapshot,
//! stored as a sorted JSON array in `stage.json` inside the metadata
//! directory. Each `stage` call replaces the prior set; a successful
//! commit consumes and deletes it.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::ignore::IgnoreSet;
use crate::infra::write_file_atomic;
use crate::repository::is_meta_path;
use crate::worktree;

/// Name of the staged-entry file inside the metadata directory.
pub const STAGE_FILE: &str = "stage.json";

/// The sentinel spec meaning "stage everything trackable".
pub const STAGE_ALL: &str = ".";

/// Per-entry outcomes of a staging operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    added: Vec<String>,
    ignored: Vec<String>,
    missing: Vec<String>,
}

impl StageReport {
    /// Paths that were staged.
    pub fn added(&self) -> &[String] {
        &self.added
    }

    /// Explicitly named paths skipped because an ignore rule matched.
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Explicitly named paths that do not exist in the working tree.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// Returns true if nothing was staged.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }
}

/// The staging area of one repository.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
    file: PathBuf,
}

impl StagingArea {
    /// Creates a staging area rooted at `root`, persisted at `file`.
    pub fn new(root: PathBuf, file: PathBuf) -> Self {
        StagingArea { root, file }
    }

    /// Resolves path specs and persists the resulting staged set.
    ///
    /// A single `"."` spec stages the full pruned-traversal result.
    /// Otherwise each spec is resolved individually: a path inside the
    /// reserved metadata directory is reported `ignored`, a missing
    /// path `missing`, an ignored path `ignored` (distinct outcomes),
    /// a directory expands via the pruning traversal, and a file is
    /// staged verbatim. The persisted set is sorted and de-duplicated,
    /// and always overwrites the previous one.
    pub fn stage(&self, ignore: &IgnoreSet, specs: &[String]) -> Result<StageReport> {
        let mut staged: BTreeSet<String> = BTreeSet::new();
        let mut report = StageReport::default();

        if specs.len() == 1 && specs[0] == STAGE_ALL {
            staged.extend(worktree::scan(&self.root, ignore)?);
        } else {
            for spec in specs {
                let rel = spec.replace('\\', "/");
                let rel = rel.trim_end_matches('/');

                // The reserved metadata subtree can never be staged
                if is_meta_path(rel) {
                    report.ignored.push(rel.to_string());
                    continue;
                }

                let abs = self.root.join(rel);

                let meta = match fs::metadata(&abs) {
                    Ok(m) => m,
                    Err(_) => {
                        report.missing.push(rel.to_string());
                        continue;
                    }
                };

                if ignore.is_ignored(rel) {
                    report.ignored.push(rel.to_string());
                    continue;
                }

                if meta.is_dir() {
                    staged.extend(worktree::scan_dir(&self.root, rel, ignore)?);
                } else {
                    staged.insert(rel.to_string());
                }
            }
        }

        report.added = staged.into_iter().collect();
        debug!(
            added = report.added.len(),
            ignored = report.ignored.len(),
            missing = report.missing.len(),
            "staged set computed"
        );

        let data = serde_json::to_vec_pretty(&report.added)?;
        write_file_atomic(&self.file, &data)?;

        Ok(report)
    }

    /// Returns the persisted staged set, or empty if absent.
    pub fn entries(&self) -> Result<Vec<String>> {
        let data = match fs::read(&self.file) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Io(e)),
        };
        let entries: Vec<String> = serde_json::from_slice(&data)?;
        Ok(entries)
    }

    /// Removes the persisted staged set.
    ///
    /// Called only after a commit has durably written both the archive
    /// and the version record; clearing earlier would lose the staged
    /// intent on a failed commit.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Path to the staged-entry file.
    pub fn file(&self) -> &Path {
        &self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel.as_bytes()).unwrap();
    }

    fn staging(temp: &TempDir) -> StagingArea {
        StagingArea::new(
            temp.path().to_path_buf(),
            temp.path().join(".zipsnap").join(STAGE_FILE),
        )
    }

    // ST-001: staging "." stages every trackable file
    #[test]
    fn test_stage_all() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.txt");
        touch(temp.path(), "src/lib.rs");
        touch(temp.path(), "skip.log");

        let area = staging(&temp);
        let ignore = IgnoreSet::from_patterns(["*.log"]);
        let report = area
            .stage(&ignore, &[STAGE_ALL.to_string()])
            .unwrap();

        assert_eq!(report.added(), ["a.txt", "src/lib.rs"]);
        assert_eq!(area.entries().unwrap(), ["a.txt", "src/lib.rs"]);
    }

    // ST-002: explicit specs report ignored and missing separately
    #[test]
    fn test_stage_explicit_outcomes() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "kept.txt");
        touch(temp.path(), "debug.log");

        let area = staging(&temp);
        let ignore = IgnoreSet::from_patterns(["*.log"]);
        let specs = vec![
            "kept.txt".to_string(),
            "debug.log".to_string(),
            "ghost.txt".to_string(),
        ];
        let report = area.stage(&ignore, &specs).unwrap();

        assert_eq!(report.added(), ["kept.txt"]);
        assert_eq!(report.ignored(), ["debug.log"]);
        assert_eq!(report.missing(), ["ghost.txt"]);
    }

    // ST-003: a directory spec expands through the pruning traversal
    #[test]
    fn test_stage_directory_expansion() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "src/main.rs");
        touch(temp.path(), "src/gen/out.tmp");
        touch(temp.path(), "other.txt");

        let area = staging(&temp);
        let ignore = IgnoreSet::from_patterns(["*.tmp"]);
        let report = area.stage(&ignore, &["src".to_string()]).unwrap();

        assert_eq!(report.added(), ["src/main.rs"]);
    }

    // ST-004: staging replaces the prior set, not accumulates
    #[test]
    fn test_stage_replaces_prior_set() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.txt");
        touch(temp.path(), "b.txt");

        let area = staging(&temp);
        let ignore = IgnoreSet::default();

        area.stage(&ignore, &["a.txt".to_string()]).unwrap();
        area.stage(&ignore, &["b.txt".to_string()]).unwrap();

        assert_eq!(area.entries().unwrap(), ["b.txt"]);
    }

    // ST-005: entries on an absent stage file is empty, clear is idempotent
    #[test]
    fn test_entries_absent_and_clear() {
        let temp = TempDir::new().unwrap();
        let area = staging(&temp);

        assert!(area.entries().unwrap().is_empty());
        area.clear().unwrap();
        area.clear().unwrap();
    }

    // ST-006: metadata paths are refused and reported as ignored
    #[test]
    fn test_stage_refuses_metadata_paths() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.txt");
        touch(temp.path(), ".zipsnap/versions/v1.json");

        let area = staging(&temp);
        let specs = vec![
            "a.txt".to_string(),
            ".zipsnap".to_string(),
            ".zipsnap/versions/v1.json".to_string(),
        ];
        let report = area.stage(&IgnoreSet::default(), &specs).unwrap();

        assert_eq!(report.added(), ["a.txt"]);
        assert_eq!(
            report.ignored(),
            [".zipsnap", ".zipsnap/versions/v1.json"]
        );
        assert_eq!(area.entries().unwrap(), ["a.txt"]);
    }

    // ST-007: duplicates collapse through set semantics
    #[test]
    fn test_stage_deduplicates() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.txt");

        let area = staging(&temp);
        let specs = vec!["a.txt".to_string(), "a.txt".to_string()];
        let report = area.stage(&IgnoreSet::default(), &specs).unwrap();

        assert_eq!(report.added(), ["a.txt"]);
    }
}
