//! Content fingerprinting.
//!
//! Fingerprints are CRC-32 (IEEE) checksums, the same checksum a zip
//! archive stores for each entry. That makes a fingerprint map read
//! from an archive directly comparable with one computed from live
//! files. A fingerprint is a change-detection signal, not a
//! cryptographic integrity guarantee: distinct contents may collide.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crc32fast::Hasher;

use crate::error::Result;

/// Read buffer size for streaming file fingerprints.
const CHUNK_SIZE: usize = 64 * 1024;

/// Computes the fingerprint of a byte slice.
pub fn fingerprint(bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

/// Computes the fingerprint of a file by streaming its contents.
///
/// Produces the same value as [`fingerprint`] over the file's full
/// byte content, without loading the file into memory at once.
pub fn fingerprint_file<P: AsRef<Path>>(path: P) -> Result<u32> {
    let mut file = File::open(path.as_ref())?;
    let mut hasher = Hasher::new();
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finalize())
}
