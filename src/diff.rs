//! Fingerprint-map diffing.
//!
//! Compares two path-to-fingerprint maps and classifies every path as
//! added, removed, or changed. The same pure function serves
//! snapshot-vs-snapshot comparison (`diff`) and snapshot-vs-working-
//! tree comparison (`status`).

use std::collections::BTreeMap;

/// The classified differences between two fingerprint maps.
///
/// All three lists are lexicographically sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    added: Vec<String>,
    removed: Vec<String>,
    changed: Vec<String>,
}

impl DiffSummary {
    /// Paths present in the newer map only.
    pub fn added(&self) -> &[String] {
        &self.added
    }

    /// Paths present in the older map only.
    pub fn removed(&self) -> &[String] {
        &self.removed
    }

    /// Paths present in both maps with differing fingerprints.
    pub fn changed(&self) -> &[String] {
        &self.changed
    }

    /// Returns true if the maps are equivalent.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Total number of differing paths.
    pub fn total(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}

/// Computes the differences from an older map `a` to a newer map `b`.
///
/// Pure and order-independent: `added` is keys in `b` not in `a`,
/// `removed` is keys in `a` not in `b`, `changed` is keys in both
/// whose fingerprints differ.
pub fn diff_maps(a: &BTreeMap<String, u32>, b: &BTreeMap<String, u32>) -> DiffSummary {
    let mut summary = DiffSummary::default();

    for (path, crc) in b {
        match a.get(path) {
            None => summary.added.push(path.clone()),
            Some(old_crc) if old_crc != crc => summary.changed.push(path.clone()),
            Some(_) => {}
        }
    }

    for path in a.keys() {
        if !b.contains_key(path) {
            summary.removed.push(path.clone());
        }
    }

    // BTreeMap iteration already yields sorted order
    summary
}
