use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use super::entry::{DirBatch, Metadata};
use super::error::FsError;
use super::node::{Node, NodeId, NodeKind, ISSUE_FILE};
use super::IssueFs;
use crate::key::IssueKey;
use crate::model::Issue;
use crate::render::{print_comment, print_issue};
use crate::source::DataSource;

/// An open node.
///
/// Each call to [`IssueFs::open`] returns a fresh handle. Content, metadata,
/// read position and enumeration cursor are private to the handle; the
/// tree it was resolved from is shared. A fresh handle starts empty and
/// fetches on first use.
#[derive(Debug)]
pub struct Handle<S: DataSource> {
    fs: IssueFs<S>,
    node: Arc<Node>,
    path: String,
    content: Option<Bytes>,
    stat: Option<Metadata>,
    /// Read offset into `content`
    pos: usize,
    /// Enumeration offset into the node's children
    cursor: usize,
    /// Metadata of issue directory children, captured when this handle
    /// fetched the issue record
    child_stats: HashMap<String, Metadata>,
}

impl<S: DataSource> Handle<S> {
    pub(crate) fn new(fs: IssueFs<S>, node: Arc<Node>, path: String) -> Self {
        Self {
            fs,
            node,
            path,
            content: None,
            stat: None,
            pos: 0,
            cursor: 0,
            child_stats: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Path this handle was opened with
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind
    }

    pub fn is_dir(&self) -> bool {
        self.node.is_dir()
    }

    /// Key of the issue this node belongs to, e.g. `TEST-1`.
    pub fn issue_key(&self) -> Option<IssueKey> {
        self.fs.issue_key(self.node.id)
    }

    /// Metadata of a child of this issue directory, if this handle has
    /// fetched the issue (by `stat` or by listing it first). Lets callers
    /// describe every child without opening each one.
    pub fn child_stat(&self, name: &str) -> Option<&Metadata> {
        self.child_stats.get(name)
    }

    /// Key as a string, for data source calls on issue-scoped nodes.
    fn key_string(&self, op: &'static str) -> Result<String, FsError> {
        self.issue_key()
            .map(|k| k.to_string())
            .ok_or_else(|| FsError::NotFound {
                op,
                path: self.path.clone(),
            })
    }

    /// Fetch this issue directory's record, keeping child metadata and
    /// recording the listing if the tree has none yet.
    async fn fetch_issue_dir(&mut self, op: &'static str) -> Result<(Issue, Arc<[NodeId]>), FsError> {
        let key = self.key_string(op)?;
        let issue = self
            .fs
            .source()
            .issue(&key)
            .await
            .map_err(|e| self.remote(op, e))?;

        self.child_stats.clear();
        for c in &issue.comments {
            let size = print_comment(c).len() as u64;
            self.child_stats
                .insert(c.id.clone(), Metadata::file(c.id.as_str(), size, c.modified()));
        }
        let size = print_issue(&issue).len() as u64;
        self.child_stats.insert(
            ISSUE_FILE.to_string(),
            Metadata::file(ISSUE_FILE, size, issue.updated),
        );

        let children = self.fs.offer_issue_children(&self.node, &issue);
        Ok((issue, children))
    }

    /// Children of this node, listing them if needed. An issue directory
    /// nobody has listed yet is listed through this handle.
    async fn children(&mut self, op: &'static str) -> Result<Arc<[NodeId]>, FsError> {
        if self.node.kind == NodeKind::IssueDir && self.node.listed_children().is_none() {
            let (_, children) = self.fetch_issue_dir(op).await?;
            return Ok(children);
        }
        self.fs
            .children(&self.node)
            .await
            .map_err(|e| self.remote(op, e))
    }

    pub async fn stat(&mut self) -> Result<Metadata, FsError> {
        debug!(path = %self.path, "stat");
        if let Some(stat) = &self.stat {
            return Ok(stat.clone());
        }

        let stat = match self.node.kind {
            NodeKind::Root => {
                let children = self.children("stat").await?;
                Metadata::dir(".", children.len() as u64, None)
            }
            NodeKind::Project => {
                let project = self
                    .fs
                    .source()
                    .project(&self.node.name)
                    .await
                    .map_err(|e| self.remote("stat", e))?;
                Metadata::dir(project.key, 0, None)
            }
            NodeKind::IssueDir => {
                let (issue, _) = self.fetch_issue_dir("stat").await?;
                let entries = issue.comments.len() as u64 + 1;
                Metadata::dir(self.node.name.as_str(), entries, Some(issue.updated))
            }
            NodeKind::IssueFile => {
                let key = self.key_string("stat")?;
                let issue = self
                    .fs
                    .source()
                    .issue(&key)
                    .await
                    .map_err(|e| self.remote("stat", e))?;
                // Likely to be read next; keep the rendering.
                let content = Bytes::from(print_issue(&issue));
                let stat =
                    Metadata::file(self.node.name.as_str(), content.len() as u64, issue.updated);
                self.content.get_or_insert(content);
                stat
            }
            NodeKind::Comment => {
                let key = self.key_string("stat")?;
                let comment = self
                    .fs
                    .source()
                    .comment(&key, &self.node.name)
                    .await
                    .map_err(|e| self.remote("stat", e))?;
                let content = Bytes::from(print_comment(&comment));
                let stat = Metadata::file(
                    self.node.name.as_str(),
                    content.len() as u64,
                    comment.modified(),
                );
                self.content.get_or_insert(content);
                stat
            }
        };

        self.stat = Some(stat.clone());
        Ok(stat)
    }

    /// Read into `buf` from the current position.
    ///
    /// Returns `Ok(0)` at the end of content. Content is fetched and
    /// rendered on first read, then served from this handle's cache.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        let content = self.content().await?;
        let remaining = content.len().saturating_sub(self.pos);
        let n = remaining.min(buf.len());
        buf[..n].copy_from_slice(&content[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    /// Read everything from the current position to the end into `buf`.
    pub async fn read_to_end(&mut self, buf: &mut Vec<u8>) -> Result<usize, FsError> {
        let content = self.content().await?;
        let rest = content.get(self.pos..).unwrap_or_default();
        buf.extend_from_slice(rest);
        self.pos = content.len();
        Ok(rest.len())
    }

    /// Rendered content of this node, materialising it on first use.
    async fn content(&mut self) -> Result<Bytes, FsError> {
        if let Some(content) = &self.content {
            return Ok(content.clone());
        }
        debug!(path = %self.path, "read");

        let rendered = match self.node.kind {
            NodeKind::IssueFile => {
                let key = self.key_string("read")?;
                let issue = self
                    .fs
                    .source()
                    .issue(&key)
                    .await
                    .map_err(|e| self.remote("read", e))?;
                print_issue(&issue)
            }
            NodeKind::Comment => {
                let key = self.key_string("read")?;
                let comment = self
                    .fs
                    .source()
                    .comment(&key, &self.node.name)
                    .await
                    .map_err(|e| self.remote("read", e))?;
                print_comment(&comment)
            }
            NodeKind::Root | NodeKind::Project | NodeKind::IssueDir => {
                let children = self.children("read").await?;
                let mut buf = String::new();
                for entry in self.fs.entries(&children) {
                    let _ = writeln!(buf, "{}", entry);
                }
                buf
            }
        };

        let content = Bytes::from(rendered);
        self.content = Some(content.clone());
        Ok(content)
    }

    /// Enumerate children.
    ///
    /// With `n <= 0`, returns every remaining child and moves the cursor to
    /// the end; an exhausted directory yields an empty batch. With `n > 0`,
    /// returns up to `n` children and sets `end` once fewer than `n` were
    /// left.
    pub async fn read_dir(&mut self, n: isize) -> Result<DirBatch, FsError> {
        debug!(path = %self.path, n, "readdir");
        if !self.node.is_dir() {
            return Err(FsError::NotADirectory {
                op: "readdir",
                path: self.path.clone(),
            });
        }

        let children = self.children("readdir").await?;
        let start = self.cursor.min(children.len());
        let remaining = &children[start..];

        if n <= 0 {
            self.cursor = children.len();
            return Ok(DirBatch {
                entries: self.fs.entries(remaining),
                end: false,
            });
        }
        if remaining.is_empty() {
            return Ok(DirBatch {
                entries: Vec::new(),
                end: true,
            });
        }

        let n = n as usize;
        let take = remaining.len().min(n);
        self.cursor = start + take;
        Ok(DirBatch {
            entries: self.fs.entries(&remaining[..take]),
            end: take < n,
        })
    }

    /// Drop cached content and metadata and rewind. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<(), FsError> {
        self.content = None;
        self.stat = None;
        self.child_stats.clear();
        self.pos = 0;
        Ok(())
    }

    fn remote<E>(&self, op: &'static str, err: E) -> FsError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        warn!(path = %self.path, op, error = %err, "data source request failed");
        FsError::remote(op, &self.path, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::NodeTable;
    use crate::testkit;

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let fs = IssueFs::new(testkit::sample());
        // an issue file hung directly off the root has no issue directory
        let node = fs.intern(NodeTable::ROOT, ISSUE_FILE, NodeKind::IssueFile);
        let mut handle = Handle::new(fs.clone(), node, ISSUE_FILE.to_string());
        assert_eq!(handle.issue_key(), None);

        let err = handle.stat().await.unwrap_err();
        assert!(err.is_not_found(), "{}", err);
        let mut buf = Vec::new();
        let err = handle.read_to_end(&mut buf).await.unwrap_err();
        assert!(err.is_not_found(), "{}", err);
        assert_eq!(fs.source().calls().total(), 0);
    }
}
