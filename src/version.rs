//! The version index.
//!
//! One JSON record per tag, stored under the metadata directory's
//! `versions/` subdirectory and named `<tag>.json`. Tag uniqueness is
//! enforced by filesystem naming plus an explicit existence check at
//! commit time, so a reused tag is rejected rather than silently
//! overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::infra::write_file_atomic;

/// Metadata for one snapshot version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    tag: String,
    message: String,
    timestamp: DateTime<Utc>,
    author: String,
    entry_count: usize,
    archive_path: PathBuf,
    size_bytes: u64,
}

impl VersionRecord {
    /// Creates a record stamped with the current time.
    pub fn new(
        tag: &str,
        message: &str,
        author: &str,
        entry_count: usize,
        archive_path: PathBuf,
        size_bytes: u64,
    ) -> Self {
        VersionRecord {
            tag: tag.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
            author: author.to_string(),
            entry_count,
            archive_path,
            size_bytes,
        }
    }

    /// The unique version tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The commit message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// When the version was created.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The recorded author.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Number of file entries in the snapshot archive.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Location of the snapshot archive.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Size of the snapshot archive in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Updates the archive-derived fields after a patch rewrite.
    ///
    /// Tag, message, timestamp, and author never change after commit.
    pub(crate) fn update_counts(&mut self, entry_count: usize, size_bytes: u64) {
        self.entry_count = entry_count;
        self.size_bytes = size_bytes;
    }
}

/// Result of listing the version index.
#[derive(Debug, Clone, Default)]
pub struct VersionListing {
    records: Vec<VersionRecord>,
    corrupt: Vec<String>,
}

impl VersionListing {
    /// Loadable records, sorted by (timestamp, tag).
    pub fn records(&self) -> &[VersionRecord] {
        &self.records
    }

    /// Names of record files that failed to parse and were skipped.
    pub fn corrupt(&self) -> &[String] {
        &self.corrupt
    }
}

/// The persisted collection of version records.
#[derive(Debug, Clone)]
pub struct VersionIndex {
    dir: PathBuf,
}

impl VersionIndex {
    /// Creates an index over the given record directory.
    pub fn new(dir: PathBuf) -> Self {
        VersionIndex { dir }
    }

    /// Validates that a tag is usable as a record file name.
    pub fn validate_tag(tag: &str) -> Result<()> {
        let ok = !tag.is_empty()
            && tag != "."
            && tag != ".."
            && !tag.contains('/')
            && !tag.contains('\\')
            && !tag.contains('\0');
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidTag(tag.to_string()))
        }
    }

    /// Path of the record file for a tag.
    pub fn record_path(&self, tag: &str) -> PathBuf {
        self.dir.join(format!("{}.json", tag))
    }

    /// Returns true if a record exists for the tag.
    pub fn contains(&self, tag: &str) -> bool {
        self.record_path(tag).is_file()
    }

    /// Writes or overwrites the record named by its tag.
    pub fn save(&self, record: &VersionRecord) -> Result<()> {
        Self::validate_tag(&record.tag)?;
        let data = serde_json::to_vec_pretty(record)?;
        write_file_atomic(self.record_path(&record.tag), &data)
    }

    /// Loads the record for a tag.
    ///
    /// An absent file is [`Error::VersionNotFound`]; a present but
    /// unparsable file is [`Error::CorruptVersionRecord`].
    pub fn load(&self, tag: &str) -> Result<VersionRecord> {
        Self::validate_tag(tag)?;
        let data = match fs::read(self.record_path(tag)) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::VersionNotFound(tag.to_string()))
            }
            Err(e) => return Err(Error::Io(e)),
        };
        serde_json::from_slice(&data).map_err(|e| Error::CorruptVersionRecord {
            tag: tag.to_string(),
            reason: e.to_string(),
        })
    }

    /// Lists all records, skipping and flagging unparsable ones.
    ///
    /// Records are sorted by (timestamp, tag) for deterministic
    /// output. An absent index directory yields an empty listing.
    pub fn list(&self) -> Result<VersionListing> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(VersionListing::default())
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let mut listing = VersionListing::default();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") || !path.is_file() {
                continue;
            }
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            let parsed = fs::read(&path)
                .ok()
                .and_then(|data| serde_json::from_slice::<VersionRecord>(&data).ok());
            match parsed {
                Some(record) => listing.records.push(record),
                None => {
                    warn!(file = %name, "skipping corrupt version record");
                    listing.corrupt.push(name);
                }
            }
        }

        listing
            .records
            .sort_by(|a, b| (a.timestamp, &a.tag).cmp(&(b.timestamp, &b.tag)));
        listing.corrupt.sort();

        Ok(listing)
    }

    /// Returns the record with the maximum (timestamp, tag).
    ///
    /// Ties on timestamp are broken by tag ordering so the result is
    /// deterministic. Corrupt records are skipped, as in [`list`].
    ///
    /// [`list`]: VersionIndex::list
    pub fn latest(&self) -> Result<Option<VersionRecord>> {
        let listing = self.list()?;
        Ok(listing.records.last().cloned())
    }
}
