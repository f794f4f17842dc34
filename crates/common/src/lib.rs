//! Core types for issuefs
//!
//! An issue tracker's projects, issues and comments presented as a
//! read-only directory tree:
//!
//! ```text
//! TEST/           project directory
//! TEST/1/         issue directory for TEST-1
//! TEST/1/issue    rendered issue, with a one-line summary per comment
//! TEST/1/69       rendered comment 69 of TEST-1
//! ```
//!
//! The tree is populated lazily from a [`DataSource`]. Nothing here talks
//! to the network directly; see the `jira` crate for an HTTP source.

pub mod fs;
pub mod key;
pub mod model;
pub mod render;
pub mod source;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use fs::{DirBatch, DirEntry, EntryKind, FsError, Handle, IssueFs, Metadata};
pub use key::{IssueKey, KeyError};
pub use model::{Comment, Issue, Project, User};
pub use source::DataSource;
