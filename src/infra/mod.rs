//! Internal infrastructure utilities.

pub(crate) mod fs;
pub(crate) mod hash;

pub(crate) use fs::{copy_dir, copy_file, to_slash, write_file_atomic};
pub(crate) use hash::fingerprint_file;
