//! Per-database ignore file.
//!
//! Acknowledged violations are remembered as handle -> rule keys in a small
//! json file named after the md5 of the database path, so each database gets
//! its own list:
//!
//! ```text
//! <data dir>/kinverify/v0.3/3f2c...e1.vfm
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};
use crate::model::Handle;
use crate::rules::RuleKey;

const FILE_VERSION: u32 = 1;

/// Handle -> rule keys the user chose to ignore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    entries: HashMap<Handle, HashSet<RuleKey>>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, handle: &str, rule: &RuleKey) -> bool {
        self.entries
            .get(handle)
            .is_some_and(|rules| rules.contains(rule))
    }

    pub fn insert(&mut self, handle: impl Into<Handle>, rule: RuleKey) {
        self.entries.entry(handle.into()).or_default().insert(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of (handle, rule) pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashSet::len).sum()
    }

    /// All pairs, sorted by handle then rule.
    pub fn pairs(&self) -> Vec<(&Handle, &RuleKey)> {
        let mut pairs: Vec<_> = self
            .entries
            .iter()
            .flat_map(|(handle, rules)| rules.iter().map(move |rule| (handle, rule)))
            .collect();
        pairs.sort();
        pairs
    }
}

#[derive(Serialize, Deserialize)]
struct IgnoreEntry {
    handle: Handle,
    rules: BTreeSet<RuleKey>,
}

#[derive(Serialize, Deserialize)]
struct IgnoreFile {
    version: u32,
    entries: Vec<IgnoreEntry>,
}

impl From<&IgnoreSet> for IgnoreFile {
    fn from(set: &IgnoreSet) -> Self {
        let mut entries: Vec<IgnoreEntry> = set
            .entries
            .iter()
            .filter(|(_, rules)| !rules.is_empty())
            .map(|(handle, rules)| IgnoreEntry {
                handle: handle.clone(),
                rules: rules.iter().cloned().collect(),
            })
            .collect();
        entries.sort_by(|a, b| a.handle.cmp(&b.handle));
        IgnoreFile { version: FILE_VERSION, entries }
    }
}

impl From<IgnoreFile> for IgnoreSet {
    fn from(file: IgnoreFile) -> Self {
        let mut set = IgnoreSet::new();
        for entry in file.entries {
            for rule in entry.rules {
                set.insert(entry.handle.clone(), rule);
            }
        }
        set
    }
}

/// File name for a database: md5 hex digest of its path plus `.vfm`.
pub fn file_name_for(database: &Path) -> String {
    let digest = Md5::digest(database.to_string_lossy().as_bytes());
    format!("{}.vfm", hex::encode(digest))
}

pub struct IgnoreStore {
    path: PathBuf,
}

impl IgnoreStore {
    /// The ignore file of `database` in the user data directory.
    pub fn for_database(database: &Path) -> Result<Self> {
        let data_dir = directories::ProjectDirs::from("", "", "kinverify")
            .ok_or(VerifyError::NoDataDir)?
            .data_dir()
            .to_path_buf();
        let version_dir = format!(
            "v{}.{}",
            env!("CARGO_PKG_VERSION_MAJOR"),
            env!("CARGO_PKG_VERSION_MINOR")
        );
        Ok(Self::at(data_dir.join(version_dir).join(file_name_for(database))))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        IgnoreStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the ignore file. A missing, unreadable or corrupt file is an
    /// empty set.
    pub fn load(&self) -> IgnoreSet {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no ignore file at {}", self.path.display());
                return IgnoreSet::new();
            }
            Err(e) => {
                tracing::warn!("could not read ignore file {}: {e}", self.path.display());
                return IgnoreSet::new();
            }
        };

        match serde_json::from_str::<IgnoreFile>(&text) {
            Ok(file) => {
                let set = IgnoreSet::from(file);
                tracing::debug!(entries = set.len(), "loaded ignore file {}", self.path.display());
                set
            }
            Err(e) => {
                tracing::warn!("ignoring corrupt ignore file {}: {e}", self.path.display());
                IgnoreSet::new()
            }
        }
    }

    /// Replaces the file contents with `set`.
    pub fn save(&self, set: &IgnoreSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&IgnoreFile::from(set))?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(entries = set.len(), "saved ignore file {}", self.path.display());
        Ok(())
    }

    /// Deletes the file. Returns whether there was one.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
