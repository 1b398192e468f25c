//! Error types for zipsnap.

use std::fmt;
use std::path::PathBuf;

/// The main error type for zipsnap operations.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred.
    Io(std::io::Error),

    /// The specified path is not a zipsnap repository.
    NotARepository(PathBuf),

    /// A repository already exists at the specified path.
    AlreadyARepository(PathBuf),

    /// Commit was requested with an empty or absent staged set.
    NothingStaged,

    /// No version record exists for the given tag.
    VersionNotFound(String),

    /// A version record for the given tag already exists.
    VersionExists(String),

    /// A version record file is present but cannot be parsed.
    CorruptVersionRecord {
        /// The tag whose record failed to parse.
        tag: String,
        /// The reason parsing failed.
        reason: String,
    },

    /// The tag is not usable as a record file name.
    InvalidTag(String),

    /// A path given to add or patch does not exist in the working tree.
    SourceNotFound(PathBuf),

    /// A restore filter selected zero archive entries.
    FilterMatchedNothing(String),

    /// An archive could not be read or written.
    Archive(zip::result::ZipError),

    /// A persisted JSON document could not be serialized or parsed.
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::NotARepository(path) => {
                write!(f, "not a zipsnap repository: {}", path.display())
            }
            Error::AlreadyARepository(path) => {
                write!(f, "repository already exists: {}", path.display())
            }
            Error::NothingStaged => write!(f, "nothing staged for commit"),
            Error::VersionNotFound(tag) => write!(f, "version not found: {}", tag),
            Error::VersionExists(tag) => write!(f, "version already exists: {}", tag),
            Error::CorruptVersionRecord { tag, reason } => {
                write!(f, "corrupt version record {}: {}", tag, reason)
            }
            Error::InvalidTag(tag) => write!(f, "invalid version tag: {:?}", tag),
            Error::SourceNotFound(path) => {
                write!(f, "source path not found: {}", path.display())
            }
            Error::FilterMatchedNothing(filter) => {
                write!(f, "no archive entry matches: {}", filter)
            }
            Error::Archive(e) => write!(f, "archive error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Archive(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Archive(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

/// Result type alias for zipsnap operations.
pub type Result<T> = std::result::Result<T, Error>;
