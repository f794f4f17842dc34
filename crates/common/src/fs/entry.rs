//! Directory entries and metadata snapshots.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Permission bits reported for every entry. The tree is read only.
pub const READ_ONLY: u32 = 0o444;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// A single name in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// `d name/` for directories, `- name` for files.
impl fmt::Display for DirEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryKind::Directory => write!(f, "d {}/", self.name),
            EntryKind::File => write!(f, "- {}", self.name),
        }
    }
}

/// Metadata snapshot returned by `stat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub kind: EntryKind,
    /// Entry count for directories, rendered byte length for files
    pub size: u64,
    /// Permission bits
    pub mode: u32,
    /// None when the tracker has no meaningful time (root, projects)
    pub modified: Option<DateTime<Utc>>,
}

impl Metadata {
    pub fn dir(name: impl Into<String>, size: u64, modified: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size,
            mode: READ_ONLY,
            modified,
        }
    }

    pub fn file(name: impl Into<String>, size: u64, modified: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
            mode: READ_ONLY,
            modified: Some(modified),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// One batch from `read_dir`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirBatch {
    pub entries: Vec<DirEntry>,
    /// End of directory. Only signalled for bounded reads (`n > 0`).
    pub end: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_entry_display() {
        let dir = DirEntry {
            name: "TEST".into(),
            kind: EntryKind::Directory,
        };
        let file = DirEntry {
            name: "issue".into(),
            kind: EntryKind::File,
        };
        assert_eq!(dir.to_string(), "d TEST/");
        assert_eq!(file.to_string(), "- issue");
    }
}
