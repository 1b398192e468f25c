//! # zipsnap
//!
//! A local, file-based version snapshot store with zip archives.
//!
//! zipsnap captures point-in-time snapshots of a working directory,
//! tracks them as named versions, and supports comparing, restoring,
//! and amending those snapshots. Each snapshot is a full zip archive;
//! change detection uses the same CRC-32 checksum the archive format
//! already stores per entry.
//!
//! ## Features
//!
//! - Staging area with `.zipsnapignore` pattern filtering
//! - One zip archive plus one JSON metadata record per version
//! - Added/removed/changed diffs between versions or against the
//!   live working tree
//! - Full or path-filtered restore
//! - In-place snapshot amendment (`patch`) with atomic rewrite
//!
//! ## Quick Start
//!
//! ```no_run
//! use zipsnap::{Repository, Result};
//!
//! fn main() -> Result<()> {
//!     let repo = Repository::init("path/to/project", "demo", "Alice", "")?;
//!
//!     repo.add(&[".".to_string()])?;
//!     let commit = repo.commit("v1.0", "first snapshot")?;
//!     println!("created {} with {} files",
//!         commit.record().tag(), commit.record().entry_count());
//!
//!     let status = repo.status()?;
//!     if let Some(changes) = status.changes() {
//!         for path in changes.changed() {
//!             println!("modified: {}", path);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`error`] - Error types and Result alias
//! - [`repository`] - Main `Repository` type and operations
//! - [`ignore`] - Ignore pattern matching
//! - [`worktree`] - Working-tree scanning
//! - [`stage`] - The staging area
//! - [`archive`] - Snapshot archive writer/reader
//! - [`version`] - Version records and the version index
//! - [`diff`] - Fingerprint-map diffing
//! - [`status`] - Working-tree status
//! - [`restore`] - The restore engine
//! - [`patch`] - The patch engine
//!
//! ## Concurrency
//!
//! Single local actor, synchronous blocking I/O. Concurrent mutation
//! of one repository root is not coordinated; callers must serialize.

pub mod archive;
pub mod config;
pub mod diff;
pub mod error;
pub mod ignore;
pub mod patch;
pub mod repository;
pub mod restore;
pub mod stage;
pub mod status;
pub mod version;
pub mod worktree;

// Internal modules (not part of public API)
pub(crate) mod infra;

// Re-export primary types for convenient access
pub use error::{Error, Result};
pub use repository::{CommitReport, Repository};

// Re-export configuration
pub use config::RepoConfig;

// Re-export pattern matching and staging types
pub use ignore::IgnoreSet;
pub use stage::{StageReport, StagingArea};

// Re-export version types
pub use version::{VersionIndex, VersionListing, VersionRecord};

// Re-export report types
pub use diff::DiffSummary;
pub use patch::PatchReport;
pub use restore::RestoreReport;
pub use status::StatusReport;
