//! Repository configuration.
//!
//! A small identity record written by `init` and stored as
//! `config.json` inside the metadata directory. The `author` field
//! feeds new version records.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::infra::write_file_atomic;

/// Name of the configuration file inside the metadata directory.
pub const CONFIG_FILE: &str = "config.json";

/// Repository identity and defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Human-readable repository name.
    pub name: String,
    /// Default author recorded on new versions.
    pub author: String,
    /// When the repository was initialized.
    pub created: DateTime<Utc>,
    /// Free-form description.
    pub description: String,
}

impl RepoConfig {
    /// Creates a configuration stamped with the current time.
    pub fn new(name: &str, author: &str, description: &str) -> Self {
        RepoConfig {
            name: name.to_string(),
            author: author.to_string(),
            created: Utc::now(),
            description: description.to_string(),
        }
    }

    /// Loads the configuration from the given file.
    ///
    /// An absent or unparsable file degrades to defaults so `open`
    /// keeps working on a repository with damaged identity metadata.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        std::fs::read(path.as_ref())
            .ok()
            .and_then(|data| serde_json::from_slice(&data).ok())
            .unwrap_or_default()
    }

    /// Persists the configuration as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = serde_json::to_vec_pretty(self)?;
        write_file_atomic(path, &data)
    }
}

impl Default for RepoConfig {
    fn default() -> Self {
        RepoConfig {
            name: "unnamed".to_string(),
            author: "Unknown".to_string(),
            created: Utc::now(),
            description: String::new(),
        }
    }
}
