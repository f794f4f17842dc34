//! Arena of tree nodes.
//!
//! Nodes are addressed by a stable [`NodeId`] and refer to their parent by
//! id, never by owning reference. A node is interned once per
//! `(parent, name)` so repeated opens of the same path share one record and
//! one children list.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::OnceCell;

use super::entry::{DirEntry, EntryKind};
use crate::key::IssueKey;

/// Index of a node in its [`NodeTable`].
pub type NodeId = usize;

/// Name of the synthetic issue file inside each issue directory.
pub const ISSUE_FILE: &str = "issue";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Project,
    IssueDir,
    IssueFile,
    Comment,
}

impl NodeKind {
    pub fn is_dir(self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Project | NodeKind::IssueDir)
    }

    pub fn entry_kind(self) -> EntryKind {
        if self.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }
}

/// A node in the tree.
///
/// Only resolution state lives here. Per-open state (content, metadata,
/// read position, enumeration cursor) belongs to a `Handle`, so nothing
/// fetched for one open is ever served to another.
#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    /// None only for the root
    pub parent: Option<NodeId>,
    /// Populated at most once; first populator wins
    pub(crate) children: OnceCell<Arc<[NodeId]>>,
}

impl Node {
    fn new(id: NodeId, kind: NodeKind, name: String, parent: Option<NodeId>) -> Self {
        Self {
            id,
            kind,
            name,
            parent,
            children: OnceCell::new(),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    pub fn entry(&self) -> DirEntry {
        DirEntry {
            name: self.name.clone(),
            kind: self.kind.entry_kind(),
        }
    }

    /// Children, if this directory has been listed.
    pub fn listed_children(&self) -> Option<&Arc<[NodeId]>> {
        self.children.get()
    }
}

/// Arena of nodes with a `(parent, name)` index.
#[derive(Debug)]
pub struct NodeTable {
    nodes: Vec<Arc<Node>>,
    by_name: HashMap<(NodeId, String), NodeId>,
}

impl Default for NodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTable {
    /// Root node id (always the first slot)
    pub const ROOT: NodeId = 0;

    /// Create a table with the root pre-registered
    pub fn new() -> Self {
        let root = Node::new(Self::ROOT, NodeKind::Root, ".".to_string(), None);
        Self {
            nodes: vec![Arc::new(root)],
            by_name: HashMap::new(),
        }
    }

    pub fn root(&self) -> Arc<Node> {
        self.nodes[Self::ROOT].clone()
    }

    pub fn get(&self, id: NodeId) -> Option<Arc<Node>> {
        self.nodes.get(id).cloned()
    }

    /// Node for an id handed out by this table
    pub(crate) fn node(&self, id: NodeId) -> Arc<Node> {
        self.nodes[id].clone()
    }

    /// Find a child by name, whether or not its parent has been listed
    pub fn lookup(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.by_name.get(&(parent, name.to_string())).copied()
    }

    /// Get or create the node for `name` under `parent`
    pub fn get_or_insert(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        if let Some(id) = self.lookup(parent, name) {
            return id;
        }

        let id = self.nodes.len();
        self.nodes
            .push(Arc::new(Node::new(id, kind, name.to_string(), Some(parent))));
        self.by_name.insert((parent, name.to_string()), id);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Listing entries for a set of children, in order
    pub fn entries(&self, ids: &[NodeId]) -> Vec<DirEntry> {
        ids.iter()
            .filter_map(|&id| self.nodes.get(id))
            .map(|node| node.entry())
            .collect()
    }

    /// Slash-separated path of a node from the root
    pub fn path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut cursor = self.nodes.get(id);
        while let Some(node) = cursor {
            if node.kind == NodeKind::Root {
                break;
            }
            names.push(node.name.as_str());
            cursor = node.parent.and_then(|p| self.nodes.get(p));
        }
        if names.is_empty() {
            return ".".to_string();
        }
        names.reverse();
        names.join("/")
    }

    /// Key of the issue a node belongs to, reconstructed from its ancestors.
    ///
    /// Issue files and comments take the project from their grandparent and
    /// the number from their parent. An issue directory takes the project
    /// from its parent and the number from its own name. Root and projects
    /// have no key. Never fetches.
    pub fn issue_key(&self, id: NodeId) -> Option<IssueKey> {
        let node = self.nodes.get(id)?;
        let (project, number) = match node.kind {
            NodeKind::IssueFile | NodeKind::Comment => {
                let dir = self.nodes.get(node.parent?)?;
                let project = self.nodes.get(dir.parent?)?;
                (project, dir.name.as_str())
            }
            NodeKind::IssueDir => {
                let project = self.nodes.get(node.parent?)?;
                (project, node.name.as_str())
            }
            NodeKind::Root | NodeKind::Project => return None,
        };
        Some(IssueKey::new(project.name.as_str(), number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tree() -> (NodeTable, NodeId, NodeId, NodeId, NodeId) {
        let mut table = NodeTable::new();
        let project = table.get_or_insert(NodeTable::ROOT, "TEST", NodeKind::Project);
        let dir = table.get_or_insert(project, "1", NodeKind::IssueDir);
        let issue = table.get_or_insert(dir, ISSUE_FILE, NodeKind::IssueFile);
        let comment = table.get_or_insert(dir, "69", NodeKind::Comment);
        (table, project, dir, issue, comment)
    }

    #[test]
    fn test_root_node() {
        let table = NodeTable::new();
        let root = table.root();
        assert_eq!(root.id, NodeTable::ROOT);
        assert_eq!(root.kind, NodeKind::Root);
        assert!(root.parent.is_none());
        assert_eq!(table.path(NodeTable::ROOT), ".");
    }

    #[test]
    fn test_get_or_insert_interns() {
        let mut table = NodeTable::new();

        let a = table.get_or_insert(NodeTable::ROOT, "TEST", NodeKind::Project);
        let b = table.get_or_insert(NodeTable::ROOT, "TEST", NodeKind::Project);
        let c = table.get_or_insert(NodeTable::ROOT, "WEB", NodeKind::Project);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, NodeTable::ROOT);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_same_name_under_different_parents() {
        let mut table = NodeTable::new();
        let test = table.get_or_insert(NodeTable::ROOT, "TEST", NodeKind::Project);
        let web = table.get_or_insert(NodeTable::ROOT, "WEB", NodeKind::Project);

        let a = table.get_or_insert(test, "1", NodeKind::IssueDir);
        let b = table.get_or_insert(web, "1", NodeKind::IssueDir);
        assert_ne!(a, b);
        assert_eq!(table.lookup(web, "1"), Some(b));
        assert_eq!(table.lookup(web, "2"), None);
    }

    #[test]
    fn test_path() {
        let (table, project, dir, issue, comment) = test_tree();
        assert_eq!(table.path(project), "TEST");
        assert_eq!(table.path(dir), "TEST/1");
        assert_eq!(table.path(issue), "TEST/1/issue");
        assert_eq!(table.path(comment), "TEST/1/69");
    }

    #[test]
    fn test_issue_key() {
        let (table, project, dir, issue, comment) = test_tree();

        let want = IssueKey::new("TEST", "1");
        for id in [comment, issue, dir] {
            assert_eq!(table.issue_key(id).as_ref(), Some(&want), "node {}", id);
        }
        assert_eq!(table.issue_key(project), None);
        assert_eq!(table.issue_key(NodeTable::ROOT), None);
        assert_eq!(want.to_string(), "TEST-1");
    }

    #[test]
    fn test_entries_keep_order() {
        let (table, _, _, issue, comment) = test_tree();
        let entries = table.entries(&[comment, issue]);
        assert_eq!(entries[0].name, "69");
        assert_eq!(entries[1].name, "issue");
        assert!(!entries[1].is_dir());
    }

}
