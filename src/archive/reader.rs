//! Snapshot archive reader.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::warn;
use zip::ZipArchive;

use crate::error::Result;

/// Reads the fingerprint map of an archive without extracting it.
///
/// Returns relative path to CRC-32 for every file entry, using the
/// checksum the archive already stores. Directory entries carry no
/// content and are not fingerprinted.
pub fn read_fingerprints<P: AsRef<Path>>(archive_path: P) -> Result<BTreeMap<String, u32>> {
    let mut archive = ZipArchive::new(File::open(archive_path.as_ref())?)?;
    let mut map = BTreeMap::new();

    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        map.insert(entry.name().to_string(), entry.crc32());
    }

    Ok(map)
}

/// Counts the file entries in an archive.
pub fn entry_count<P: AsRef<Path>>(archive_path: P) -> Result<usize> {
    let mut archive = ZipArchive::new(File::open(archive_path.as_ref())?)?;
    let mut count = 0;

    for i in 0..archive.len() {
        if !archive.by_index(i)?.is_dir() {
            count += 1;
        }
    }

    Ok(count)
}

/// Extracts archive entries onto a destination root.
///
/// Parent directories are created as needed, existing files are
/// overwritten, and stored unix modes are preserved. When `filter` is
/// set, only the entry equal to it or entries nested under
/// `filter + "/"` are extracted; the caller distinguishes an empty
/// result under a filter from an empty archive. Per-entry failures
/// are skipped with a warning, not fatal.
///
/// Returns the relative paths of the files extracted, sorted.
pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    dest_root: Q,
    filter: Option<&str>,
) -> Result<Vec<String>> {
    let dest_root = dest_root.as_ref();
    let mut archive = ZipArchive::new(File::open(archive_path.as_ref())?)?;
    let mut extracted = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();

        if let Some(filter) = filter {
            if name != filter && !name.starts_with(&format!("{}/", filter)) {
                continue;
            }
        }

        // Guard against entries escaping the destination root
        let rel = match entry.enclosed_name() {
            Some(p) => p,
            None => {
                warn!(entry = %name, "unsafe entry name, skipping");
                continue;
            }
        };
        let out_path = dest_root.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut out = match File::create(&out_path) {
            Ok(f) => f,
            Err(e) => {
                warn!(entry = %name, error = %e, "cannot create file, skipping");
                continue;
            }
        };
        if let Err(e) = io::copy(&mut entry, &mut out) {
            warn!(entry = %name, error = %e, "write failed, skipping");
            continue;
        }

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&out_path, fs::Permissions::from_mode(mode));
        }

        extracted.push(name);
    }

    extracted.sort();
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::write;
    use tempfile::TempDir;

    fn make_archive(files: &[(&str, &[u8])]) -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let mut entries = Vec::new();
        for (rel, content) in files {
            let path = src.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
            entries.push(rel.to_string());
        }
        let archive = temp.path().join("snap.zip");
        write(&src, &archive, &entries).unwrap();
        (temp, archive)
    }

    // AR-001: extract without filter restores every entry
    #[test]
    fn test_extract_all() {
        let (temp, archive) = make_archive(&[("a.txt", b"alpha"), ("d/b.txt", b"beta")]);

        let dest = temp.path().join("out");
        let extracted = extract(&archive, &dest, None).unwrap();

        assert_eq!(extracted, ["a.txt", "d/b.txt"]);
        assert_eq!(fs::read(dest.join("a.txt")).unwrap(), b"alpha");
        assert_eq!(fs::read(dest.join("d/b.txt")).unwrap(), b"beta");
    }

    // AR-002: extract overwrites existing files at the destination
    #[test]
    fn test_extract_overwrites() {
        let (temp, archive) = make_archive(&[("a.txt", b"new")]);

        let dest = temp.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("a.txt"), b"old").unwrap();

        extract(&archive, &dest, None).unwrap();
        assert_eq!(fs::read(dest.join("a.txt")).unwrap(), b"new");
    }

    // AR-003: an exact-path filter extracts only that entry
    #[test]
    fn test_extract_filter_exact() {
        let (temp, archive) = make_archive(&[("a.txt", b"a"), ("b.txt", b"b")]);

        let dest = temp.path().join("out");
        let extracted = extract(&archive, &dest, Some("b.txt")).unwrap();

        assert_eq!(extracted, ["b.txt"]);
        assert!(!dest.join("a.txt").exists());
    }

    // AR-004: a directory filter extracts the nested subtree only
    #[test]
    fn test_extract_filter_prefix() {
        let (temp, archive) = make_archive(&[
            ("src/main.rs", b"m"),
            ("src/lib.rs", b"l"),
            ("srcX/other.rs", b"o"),
            ("README.md", b"r"),
        ]);

        let dest = temp.path().join("out");
        let extracted = extract(&archive, &dest, Some("src")).unwrap();

        assert_eq!(extracted, ["src/lib.rs", "src/main.rs"]);
        assert!(!dest.join("srcX/other.rs").exists());
    }

    // AR-005: a filter matching nothing extracts nothing
    #[test]
    fn test_extract_filter_matches_nothing() {
        let (temp, archive) = make_archive(&[("a.txt", b"a")]);

        let dest = temp.path().join("out");
        let extracted = extract(&archive, &dest, Some("nosuchfile.txt")).unwrap();

        assert!(extracted.is_empty());
        assert!(!dest.join("a.txt").exists());
    }

    // AR-006: entry_count counts file entries
    #[test]
    fn test_entry_count() {
        let (_temp, archive) = make_archive(&[("a.txt", b"a"), ("d/b.txt", b"b")]);
        assert_eq!(entry_count(&archive).unwrap(), 2);
    }

    // AR-007: opening a missing archive is an error
    #[test]
    fn test_missing_archive() {
        let temp = TempDir::new().unwrap();
        assert!(read_fingerprints(temp.path().join("absent.zip")).is_err());
    }
}
