//! Ignore pattern matching.
//!
//! Patterns are loaded from a `.zipsnapignore` file at the repository
//! root, one pattern per line. Blank lines and `#` comment lines are
//! skipped. Two pattern forms exist:
//!
//! - A pattern ending in `/` is a directory-prefix rule: it matches
//!   any path that starts with that literal prefix.
//! - Any other pattern is a glob, evaluated against the full relative
//!   path and against the final path segment (the `.gitignore`-style
//!   basename fallback). Matching either way ignores the path.
//!
//! Negation syntax is not supported.

use std::fs;
use std::path::Path;

use glob::{MatchOptions, Pattern};

/// Name of the ignore pattern file at the repository root.
pub const IGNORE_FILE: &str = ".zipsnapignore";

/// Glob options for full-path matches: `*` must not cross `/`.
const PATH_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// An ordered set of ignore patterns.
///
/// Loaded once per operation and immutable for its duration.
/// `is_ignored` is a pure predicate: pattern order does not affect
/// the outcome, only how early matching short-circuits.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    patterns: Vec<String>,
}

impl IgnoreSet {
    /// Loads the ignore set from the `.zipsnapignore` file under `root`.
    ///
    /// An absent file yields an empty set.
    pub fn load<P: AsRef<Path>>(root: P) -> Self {
        let path = root.as_ref().join(IGNORE_FILE);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return IgnoreSet::default(),
        };

        let patterns = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.to_string())
            .collect();

        IgnoreSet { patterns }
    }

    /// Creates an ignore set from explicit patterns.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IgnoreSet {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the patterns in source order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns true if the set contains no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns true if the given relative path matches an ignore rule.
    ///
    /// The candidate path is normalized to forward slashes before
    /// comparison, as is each pattern.
    pub fn is_ignored(&self, rel_path: &str) -> bool {
        let candidate = rel_path.replace('\\', "/");
        let basename = candidate.rsplit('/').next().unwrap_or(&candidate);

        for raw in &self.patterns {
            let pattern = raw.trim().replace('\\', "/");
            if pattern.is_empty() {
                continue;
            }

            // Directory-prefix rule: literal prefix, no glob expansion
            if let Some(prefix) = pattern.strip_suffix('/') {
                if candidate == prefix || candidate.starts_with(&pattern) {
                    return true;
                }
                continue;
            }

            let compiled = match Pattern::new(&pattern) {
                Ok(p) => p,
                Err(_) => continue,
            };
            if compiled.matches_with(&candidate, PATH_MATCH) {
                return true;
            }
            // Basename fallback
            if compiled.matches_with(basename, PATH_MATCH) {
                return true;
            }
        }

        false
    }
}
