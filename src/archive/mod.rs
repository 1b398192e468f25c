//! Snapshot archive serialization.
//!
//! A snapshot is a standard zip archive holding one entry per file,
//! keyed by slash-separated relative path, with the file mode stored
//! as unix permissions. The writer produces archives from the working
//! tree or a scratch directory; the reader enumerates entries with
//! their stored fingerprints and extracts all or a filtered subset.

mod reader;
mod writer;

pub use reader::{entry_count, extract, read_fingerprints};
pub use writer::{write, write_tree, WriteSummary};
