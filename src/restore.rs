//! The restore engine.
//!
//! Extracts all or a path-filtered subset of a snapshot back onto the
//! working tree, overwriting local modifications without prompting.
//! Destructive by design; callers wanting confirmation must ask
//! before invoking.

use std::path::Path;

use tracing::info;

use crate::archive;
use crate::error::{Error, Result};
use crate::version::VersionIndex;

/// Outcome of a restore operation.
#[derive(Debug, Clone)]
pub struct RestoreReport {
    tag: String,
    restored: Vec<String>,
}

impl RestoreReport {
    /// The tag that was restored.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Relative paths written back onto the working tree, sorted.
    pub fn restored(&self) -> &[String] {
        &self.restored
    }
}

/// Restores a snapshot onto the working tree.
///
/// With a `filter`, only the entry equal to the filter path or
/// entries nested under it are extracted; a filter that selects zero
/// entries fails with [`Error::FilterMatchedNothing`] and writes no
/// files. Restoring an empty archive without a filter succeeds with
/// an empty report.
pub fn restore(
    root: &Path,
    index: &VersionIndex,
    tag: &str,
    filter: Option<&str>,
) -> Result<RestoreReport> {
    let record = index.load(tag)?;

    let filter = filter.map(|f| {
        let f = f.replace('\\', "/");
        f.trim_end_matches('/').to_string()
    });
    let filter = filter.as_deref();

    let restored = archive::extract(root.join(record.archive_path()), root, filter)?;

    if let Some(filter) = filter {
        if restored.is_empty() {
            return Err(Error::FilterMatchedNothing(filter.to_string()));
        }
    }

    info!(tag = %tag, files = restored.len(), "restore complete");

    Ok(RestoreReport {
        tag: tag.to_string(),
        restored,
    })
}
