//! Read-only filesystem projection of a tracker.
//!
//! # Architecture
//!
//! - `IssueFs`: entry point; resolves paths and owns the shared tree
//! - `NodeTable`: arena of nodes, interned by `(parent, name)`
//! - `Handle`: per-open copy of a node with its own caches and cursors,
//!   including the child metadata captured when it lists an issue
//!
//! # Sharing
//!
//! The only state shared between opens is the node arena and each
//! directory's children list. A children list is populated at most once
//! (first populator wins) and is immutable afterwards. Everything a caller
//! mutates lives on its own `Handle`, so concurrent callers never observe
//! each other's caches or cursors.

mod entry;
mod error;
mod handle;
mod node;
pub mod path;

pub use entry::{DirBatch, DirEntry, EntryKind, Metadata, READ_ONLY};
pub use error::{BoxError, FsError};
pub use handle::Handle;
pub use node::{Node, NodeId, NodeKind, NodeTable, ISSUE_FILE};

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::key::{is_issue_number, IssueKey};
use crate::model::Issue;
use crate::source::DataSource;

/// The filesystem. Clones share the same tree and data source.
#[derive(Debug)]
pub struct IssueFs<S: DataSource> {
    inner: Arc<Inner<S>>,
}

#[derive(Debug)]
struct Inner<S> {
    source: Arc<S>,
    table: RwLock<NodeTable>,
}

impl<S: DataSource> Clone for IssueFs<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: DataSource> IssueFs<S> {
    pub fn new(source: S) -> Self {
        Self::from_arc(Arc::new(source))
    }

    pub fn from_arc(source: Arc<S>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                table: RwLock::new(NodeTable::new()),
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Open `name`, returning an independent handle to it.
    ///
    /// Fails with [`FsError::InvalidPath`] before any fetch if the path is
    /// malformed, and with [`FsError::NotFound`] if any segment has no
    /// remote counterpart. A failed open leaves no handle behind.
    pub async fn open(&self, name: &str) -> Result<Handle<S>, FsError> {
        if !path::is_valid(name) {
            return Err(FsError::InvalidPath {
                op: "open",
                path: name.to_string(),
            });
        }
        debug!(path = %name, "open");

        let mut node = self.root().await.map_err(|e| {
            warn!(path = %name, error = %e, "failed to list projects");
            FsError::remote("open", name, e)
        })?;
        if name != path::ROOT {
            for segment in path::segments(name) {
                node = self
                    .find(&node, segment)
                    .await
                    .map_err(|e| FsError::remote("open", name, e))?
                    .ok_or_else(|| FsError::NotFound {
                        op: "open",
                        path: name.to_string(),
                    })?;
            }
        }

        Ok(Handle::new(self.clone(), node, name.to_string()))
    }

    /// The root node, with its project list populated.
    async fn root(&self) -> Result<Arc<Node>, S::Error> {
        let root = self.inner.table.read().root();
        self.children(&root).await?;
        Ok(root)
    }

    /// Resolve one segment below `dir`. `Ok(None)` means it does not exist.
    async fn find(&self, dir: &Arc<Node>, name: &str) -> Result<Option<Arc<Node>>, S::Error> {
        match dir.kind {
            // Projects only come from the cached listing.
            NodeKind::Root => Ok(self.listed(dir, name)),
            NodeKind::Project => {
                if !is_issue_number(name) {
                    return Ok(None);
                }
                if let Some(node) = self.listed(dir, name) {
                    return Ok(Some(node));
                }
                let key = IssueKey::new(dir.name.as_str(), name);
                if !self.inner.source.issue_exists(&key.to_string()).await? {
                    return Ok(None);
                }
                Ok(Some(self.intern(dir.id, name, NodeKind::IssueDir)))
            }
            NodeKind::IssueDir => {
                if name == ISSUE_FILE {
                    return Ok(Some(self.intern(dir.id, name, NodeKind::IssueFile)));
                }
                if let Some(node) = self.listed(dir, name) {
                    return Ok(Some(node));
                }
                let Some(key) = self.issue_key(dir.id) else {
                    return Ok(None);
                };
                if !self
                    .inner
                    .source
                    .comment_exists(&key.to_string(), name)
                    .await?
                {
                    return Ok(None);
                }
                Ok(Some(self.intern(dir.id, name, NodeKind::Comment)))
            }
            NodeKind::IssueFile | NodeKind::Comment => Ok(None),
        }
    }

    /// A child of `dir` named `name`, if `dir` has been listed and the
    /// listing contains it.
    fn listed(&self, dir: &Node, name: &str) -> Option<Arc<Node>> {
        let children = dir.listed_children()?;
        let table = self.inner.table.read();
        let id = table.lookup(dir.id, name)?;
        if children.contains(&id) {
            table.get(id)
        } else {
            None
        }
    }

    fn intern(&self, parent: NodeId, name: &str, kind: NodeKind) -> Arc<Node> {
        let mut table = self.inner.table.write();
        let id = table.get_or_insert(parent, name, kind);
        table.node(id)
    }

    /// Children of a directory node, listing them on first use.
    ///
    /// Concurrent first callers race under the node's cell; one fetch wins
    /// and the rest observe its result. A failed fetch populates nothing.
    pub(crate) async fn children(&self, node: &Arc<Node>) -> Result<Arc<[NodeId]>, S::Error> {
        let children = node.children.get_or_try_init(|| self.list(node)).await?;
        Ok(children.clone())
    }

    async fn list(&self, node: &Node) -> Result<Arc<[NodeId]>, S::Error> {
        match node.kind {
            NodeKind::Root => {
                let projects = self.inner.source.projects().await?;
                let mut table = self.inner.table.write();
                let ids: Vec<NodeId> = projects
                    .iter()
                    .map(|p| table.get_or_insert(node.id, &p.key, NodeKind::Project))
                    .collect();
                debug!(count = ids.len(), "listed projects");
                Ok(Arc::from(ids))
            }
            NodeKind::Project => {
                let issues = self.inner.source.issues(&node.name).await?;
                let mut table = self.inner.table.write();
                let ids: Vec<NodeId> = issues
                    .iter()
                    .map(|is| table.get_or_insert(node.id, is.name(), NodeKind::IssueDir))
                    .collect();
                debug!(project = %node.name, count = ids.len(), "listed issues");
                Ok(Arc::from(ids))
            }
            NodeKind::IssueDir => {
                let Some(key) = self.issue_key(node.id) else {
                    return Ok(Arc::from(Vec::new()));
                };
                let issue = self.inner.source.issue(&key.to_string()).await?;
                debug!(issue = %key, count = issue.comments.len(), "listed comments");
                Ok(self.issue_children(node, &issue))
            }
            NodeKind::IssueFile | NodeKind::Comment => Ok(Arc::from(Vec::new())),
        }
    }

    /// Build the children of an issue directory from a fetched issue: one
    /// node per comment in order, then the issue file last.
    fn issue_children(&self, dir: &Node, issue: &Issue) -> Arc<[NodeId]> {
        let mut table = self.inner.table.write();
        let mut ids: Vec<NodeId> = issue
            .comments
            .iter()
            .map(|c| table.get_or_insert(dir.id, &c.id, NodeKind::Comment))
            .collect();
        ids.push(table.get_or_insert(dir.id, ISSUE_FILE, NodeKind::IssueFile));
        Arc::from(ids)
    }

    /// Record the children of an issue directory from an issue fetched by
    /// a handle, returning the directory's children. An earlier listing
    /// wins.
    pub(crate) fn offer_issue_children(&self, dir: &Node, issue: &Issue) -> Arc<[NodeId]> {
        if let Some(ids) = dir.listed_children() {
            return ids.clone();
        }
        let ids = self.issue_children(dir, issue);
        match dir.children.set(ids.clone()) {
            Ok(()) => ids,
            Err(_) => dir.listed_children().cloned().unwrap_or(ids),
        }
    }

    pub(crate) fn entries(&self, ids: &[NodeId]) -> Vec<DirEntry> {
        self.inner.table.read().entries(ids)
    }

    pub(crate) fn issue_key(&self, id: NodeId) -> Option<IssueKey> {
        self.inner.table.read().issue_key(id)
    }

    /// Number of nodes interned so far.
    pub fn node_count(&self) -> usize {
        self.inner.table.read().len()
    }
}
