//! Repository operations.
//!
//! The `Repository` type is the main entry point. It holds the
//! resolved repository root and threads it explicitly through every
//! component call; the core never reads the process working directory
//! or any other ambient state.
//!
//! The repository assumes a single local actor: operations are
//! synchronous, blocking, and unserialized. Callers running multiple
//! processes against the same root must provide their own mutual
//! exclusion.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::archive;
use crate::config::{RepoConfig, CONFIG_FILE};
use crate::diff::{diff_maps, DiffSummary};
use crate::error::{Error, Result};
use crate::ignore::{IgnoreSet, IGNORE_FILE};
use crate::patch::{self, PatchReport};
use crate::restore::{self, RestoreReport};
use crate::stage::{StageReport, StagingArea, STAGE_FILE};
use crate::status::{compute_status, StatusReport};
use crate::version::{VersionIndex, VersionListing, VersionRecord};

/// Name of the reserved metadata directory under the repository root.
pub const META_DIR: &str = ".zipsnap";

/// Subdirectory of the metadata directory holding version records.
const VERSIONS_DIR: &str = "versions";

/// Subdirectory of the metadata directory holding snapshot archives.
const STORAGE_DIR: &str = "storage";

/// Returns true if a relative slash path names the metadata directory
/// or anything inside it.
pub(crate) fn is_meta_path(rel: &str) -> bool {
    match rel.strip_prefix(META_DIR) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Seed content for the ignore file written by `init`.
const DEFAULT_IGNORE: &str = "\
# zipsnap ignore file
# One pattern per line; '#' starts a comment.
# A trailing '/' makes a directory-prefix rule.

.zipsnap/
*.log
*.tmp
.DS_Store
Thumbs.db
node_modules/
target/
.env
";

/// Outcome of a commit.
#[derive(Debug, Clone)]
pub struct CommitReport {
    record: VersionRecord,
    skipped: Vec<String>,
}

impl CommitReport {
    /// The version record that was created.
    pub fn record(&self) -> &VersionRecord {
        &self.record
    }

    /// Staged paths that no longer existed at write time.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

/// A zipsnap repository.
#[derive(Debug, Clone)]
pub struct Repository {
    /// The resolved root of the working tree.
    root: PathBuf,
    /// Repository identity loaded from `config.json`.
    config: RepoConfig,
}

impl Repository {
    /// Initializes a new repository at an existing directory.
    ///
    /// Creates the metadata directory with its `versions/` and
    /// `storage/` subdirectories, writes `config.json`, and seeds a
    /// default ignore file unless one already exists.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyARepository`] if the metadata directory exists.
    pub fn init<P: AsRef<Path>>(
        path: P,
        name: &str,
        author: &str,
        description: &str,
    ) -> Result<Self> {
        let root = path
            .as_ref()
            .canonicalize()
            .map_err(|_| Error::NotARepository(path.as_ref().to_path_buf()))?;

        let meta_dir = root.join(META_DIR);
        if meta_dir.exists() {
            return Err(Error::AlreadyARepository(root));
        }

        fs::create_dir_all(meta_dir.join(VERSIONS_DIR))?;
        fs::create_dir_all(meta_dir.join(STORAGE_DIR))?;

        let config = RepoConfig::new(name, author, description);
        config.save(meta_dir.join(CONFIG_FILE))?;

        let ignore_path = root.join(IGNORE_FILE);
        if !ignore_path.exists() {
            fs::write(&ignore_path, DEFAULT_IGNORE)?;
        }

        info!(root = %root.display(), name = %name, "initialized repository");

        Ok(Repository { root, config })
    }

    /// Opens an existing repository.
    ///
    /// # Errors
    ///
    /// [`Error::NotARepository`] if the metadata directory is absent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path
            .as_ref()
            .canonicalize()
            .map_err(|_| Error::NotARepository(path.as_ref().to_path_buf()))?;

        let meta_dir = root.join(META_DIR);
        if !meta_dir.is_dir() {
            return Err(Error::NotARepository(root));
        }

        let config = RepoConfig::load_or_default(meta_dir.join(CONFIG_FILE));

        Ok(Repository { root, config })
    }

    /// Returns the repository root.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Returns the repository configuration.
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Loads the current ignore pattern set.
    ///
    /// Loaded fresh so edits to the ignore file take effect on the
    /// next operation.
    pub fn ignore(&self) -> IgnoreSet {
        IgnoreSet::load(&self.root)
    }

    /// Stages files for the next commit.
    ///
    /// `specs` is either the single sentinel `"."` or a list of
    /// explicit file and directory paths relative to the root. Each
    /// call replaces the previously staged set.
    pub fn add(&self, specs: &[String]) -> Result<StageReport> {
        let ignore = self.ignore();
        self.staging().stage(&ignore, specs)
    }

    /// Returns the currently staged paths, or empty if none.
    pub fn staged(&self) -> Result<Vec<String>> {
        self.staging().entries()
    }

    /// Creates a new version from the staged set.
    ///
    /// Writes the snapshot archive first, then the version record,
    /// and clears the staging area only after both are durable.
    ///
    /// # Errors
    ///
    /// [`Error::NothingStaged`] with an empty or absent staged set,
    /// [`Error::VersionExists`] if the tag is already taken. Neither
    /// leaves an archive or record behind.
    pub fn commit(&self, tag: &str, message: &str) -> Result<CommitReport> {
        VersionIndex::validate_tag(tag)?;

        let index = self.version_index();
        if index.contains(tag) {
            return Err(Error::VersionExists(tag.to_string()));
        }

        let staging = self.staging();
        let staged = staging.entries()?;
        if staged.is_empty() {
            return Err(Error::NothingStaged);
        }

        let archive_rel: PathBuf = [META_DIR, STORAGE_DIR, &format!("{}.zip", tag)]
            .iter()
            .collect();
        let summary = archive::write(&self.root, self.root.join(&archive_rel), &staged)?;

        let record = VersionRecord::new(
            tag,
            message,
            &self.config.author,
            summary.entry_count(),
            archive_rel,
            summary.size_bytes(),
        );
        index.save(&record)?;

        staging.clear()?;

        info!(
            tag = %tag,
            entries = summary.entry_count(),
            bytes = summary.size_bytes(),
            "version created"
        );

        Ok(CommitReport {
            record,
            skipped: summary.skipped().to_vec(),
        })
    }

    /// Reports the working tree's state against the latest version.
    pub fn status(&self) -> Result<StatusReport> {
        let ignore = self.ignore();
        compute_status(&self.root, &ignore, &self.version_index())
    }

    /// Compares two versions, older tag first.
    pub fn diff(&self, old_tag: &str, new_tag: &str) -> Result<DiffSummary> {
        let index = self.version_index();
        let old = index.load(old_tag)?;
        let new = index.load(new_tag)?;

        let old_map = archive::read_fingerprints(self.root.join(old.archive_path()))?;
        let new_map = archive::read_fingerprints(self.root.join(new.archive_path()))?;

        Ok(diff_maps(&old_map, &new_map))
    }

    /// Restores a version onto the working tree.
    ///
    /// Overwrites local files without prompting. With `filter`, only
    /// the matching entry or subtree is extracted.
    pub fn restore(&self, tag: &str, filter: Option<&str>) -> Result<RestoreReport> {
        restore::restore(&self.root, &self.version_index(), tag, filter)
    }

    /// Amends an existing version with a file or directory from the
    /// working tree.
    pub fn patch(&self, tag: &str, add_path: &str) -> Result<PatchReport> {
        patch::patch(&self.root, &self.version_index(), tag, add_path)
    }

    /// Lists all versions, flagging corrupt records.
    pub fn versions(&self) -> Result<VersionListing> {
        self.version_index().list()
    }

    /// Returns the most recent version, if any.
    pub fn latest(&self) -> Result<Option<VersionRecord>> {
        self.version_index().latest()
    }

    fn meta_dir(&self) -> PathBuf {
        self.root.join(META_DIR)
    }

    fn staging(&self) -> StagingArea {
        StagingArea::new(self.root.clone(), self.meta_dir().join(STAGE_FILE))
    }

    fn version_index(&self) -> VersionIndex {
        VersionIndex::new(self.meta_dir().join(VERSIONS_DIR))
    }
}
