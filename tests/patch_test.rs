//! Integration tests for the patch engine.
//!
//! Test cases: P-101 to P-106

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use zipsnap::{Error, Repository};

/// Helper to create an initialized repository with an empty ignore file.
fn create_test_repo() -> (TempDir, Repository) {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".zipsnapignore"), "").unwrap();
    let repo = Repository::init(temp.path(), "test", "Tester", "integration fixture").unwrap();
    (temp, repo)
}

fn touch(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Commits v1 containing a.txt and b.txt.
fn commit_v1(temp: &TempDir, repo: &Repository) {
    touch(temp.path(), "a.txt", b"original a");
    touch(temp.path(), "b.txt", b"original b");
    repo.add(&["a.txt".to_string(), "b.txt".to_string()]).unwrap();
    repo.commit("v1", "baseline").unwrap();
}

// P-101: patching a new file into a snapshot grows it to three entries
// and a later restore reproduces all three byte for byte
#[test]
fn test_p101_patch_adds_file() {
    let (temp, repo) = create_test_repo();
    commit_v1(&temp, &repo);

    touch(temp.path(), "newfile.txt", b"added later");
    let report = repo.patch("v1", "newfile.txt").unwrap();

    assert_eq!(report.tag(), "v1");
    assert_eq!(report.added_path(), "newfile.txt");
    assert_eq!(report.entry_count(), 3);

    // The record reflects the rewritten archive
    let record = repo.versions().unwrap().records()[0].clone();
    assert_eq!(record.entry_count(), 3);
    assert!(record.size_bytes() > 0);

    // Wipe the tree and restore to prove the amended snapshot is whole
    fs::remove_file(temp.path().join("a.txt")).unwrap();
    fs::remove_file(temp.path().join("b.txt")).unwrap();
    fs::remove_file(temp.path().join("newfile.txt")).unwrap();

    let restored = repo.restore("v1", None).unwrap();
    assert_eq!(restored.restored(), ["a.txt", "b.txt", "newfile.txt"]);
    assert_eq!(fs::read(temp.path().join("a.txt")).unwrap(), b"original a");
    assert_eq!(fs::read(temp.path().join("b.txt")).unwrap(), b"original b");
    assert_eq!(
        fs::read(temp.path().join("newfile.txt")).unwrap(),
        b"added later"
    );
}

// P-102: patching an existing entry replaces its content
#[test]
fn test_p102_patch_overwrites_entry() {
    let (temp, repo) = create_test_repo();
    commit_v1(&temp, &repo);

    touch(temp.path(), "a.txt", b"revised a");
    let report = repo.patch("v1", "a.txt").unwrap();
    assert_eq!(report.entry_count(), 2);

    fs::remove_file(temp.path().join("a.txt")).unwrap();
    repo.restore("v1", Some("a.txt")).unwrap();
    assert_eq!(fs::read(temp.path().join("a.txt")).unwrap(), b"revised a");
}

// P-103: a directory source overlays its whole subtree
#[test]
fn test_p103_patch_directory() {
    let (temp, repo) = create_test_repo();
    commit_v1(&temp, &repo);

    touch(temp.path(), "tools/build.sh", b"#!/bin/sh");
    touch(temp.path(), "tools/deploy.sh", b"#!/bin/sh -e");

    let report = repo.patch("v1", "tools/").unwrap();
    assert_eq!(report.added_path(), "tools");
    assert_eq!(report.entry_count(), 4);

    fs::remove_dir_all(temp.path().join("tools")).unwrap();
    let restored = repo.restore("v1", Some("tools")).unwrap();
    assert_eq!(restored.restored(), ["tools/build.sh", "tools/deploy.sh"]);
}

// P-104: a missing source fails before the archive is touched
#[test]
fn test_p104_patch_missing_source() {
    let (temp, repo) = create_test_repo();
    commit_v1(&temp, &repo);

    let result = repo.patch("v1", "no_such_path");
    assert!(matches!(result, Err(Error::SourceNotFound(_))));

    // Archive and record are intact
    let record = repo.versions().unwrap().records()[0].clone();
    assert_eq!(record.entry_count(), 2);
    let restored = repo.restore("v1", None).unwrap();
    assert_eq!(restored.restored(), ["a.txt", "b.txt"]);
}

// P-105: patch preserves the record's identity fields
#[test]
fn test_p105_patch_preserves_identity() {
    let (temp, repo) = create_test_repo();
    commit_v1(&temp, &repo);
    let before = repo.versions().unwrap().records()[0].clone();

    touch(temp.path(), "extra.txt", b"extra");
    repo.patch("v1", "extra.txt").unwrap();

    let after = repo.versions().unwrap().records()[0].clone();
    assert_eq!(after.tag(), before.tag());
    assert_eq!(after.message(), before.message());
    assert_eq!(after.author(), before.author());
    assert_eq!(after.timestamp(), before.timestamp());
    assert_eq!(after.entry_count(), 3);
}

// P-106: absolute and traversing source specs are rejected before the
// archive is touched
#[test]
fn test_p106_patch_rejects_escaping_paths() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("repo");
    fs::create_dir(&root).unwrap();
    fs::write(root.join(".zipsnapignore"), "").unwrap();
    let repo = Repository::init(&root, "test", "Tester", "integration fixture").unwrap();

    touch(&root, "a.txt", b"original a");
    touch(&root, "b.txt", b"original b");
    repo.add(&["a.txt".to_string(), "b.txt".to_string()]).unwrap();
    repo.commit("v1", "baseline").unwrap();

    // A real file one level above the repository root
    fs::write(temp.path().join("outside.txt"), b"out").unwrap();

    for spec in ["../outside.txt", "a/../../outside.txt", "/etc/hostname"] {
        let result = repo.patch("v1", spec);
        assert!(
            matches!(result, Err(Error::SourceNotFound(_))),
            "spec {:?} should be rejected",
            spec
        );
    }

    let record = repo.versions().unwrap().records()[0].clone();
    assert_eq!(record.entry_count(), 2);
}

// P-107: patching an unknown tag fails
#[test]
fn test_p106_unknown_tag() {
    let (temp, repo) = create_test_repo();
    commit_v1(&temp, &repo);

    let result = repo.patch("ghost", "a.txt");
    assert!(matches!(result, Err(Error::VersionNotFound(_))));
}
