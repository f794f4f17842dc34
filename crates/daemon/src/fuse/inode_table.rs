//! Inode numbers for tree paths.
//!
//! The kernel names everything by a 64-bit inode. Tree paths get an inode
//! the first time they are looked up and keep it for the life of the mount;
//! the tree is read only, so nothing is ever renamed or removed.

use std::collections::HashMap;

use common::fs::path;

#[derive(Debug)]
pub struct InodeTable {
    by_path: HashMap<String, u64>,
    paths: HashMap<u64, String>,
    next_inode: u64,
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InodeTable {
    /// Root inode number (always 1 in FUSE)
    pub const ROOT_INODE: u64 = 1;

    pub fn new() -> Self {
        let mut table = Self {
            by_path: HashMap::new(),
            paths: HashMap::new(),
            next_inode: Self::ROOT_INODE + 1,
        };
        table.by_path.insert(path::ROOT.to_string(), Self::ROOT_INODE);
        table.paths.insert(Self::ROOT_INODE, path::ROOT.to_string());
        table
    }

    /// Inode for a tree path (`.` or `TEST/1/issue`), allocating one if new.
    pub fn get_or_create(&mut self, path: &str) -> u64 {
        if let Some(&inode) = self.by_path.get(path) {
            return inode;
        }
        let inode = self.next_inode;
        self.next_inode += 1;
        self.by_path.insert(path.to_string(), inode);
        self.paths.insert(inode, path.to_string());
        inode
    }

    pub fn get_inode(&self, path: &str) -> Option<u64> {
        self.by_path.get(path).copied()
    }

    pub fn get_path(&self, inode: u64) -> Option<&str> {
        self.paths.get(&inode).map(String::as_str)
    }

    /// Inode of the directory containing `inode`; the root is its own parent.
    pub fn parent(&self, inode: u64) -> Option<u64> {
        let path = self.get_path(inode)?;
        match path.rsplit_once('/') {
            Some((parent, _)) => self.get_inode(parent),
            None => Some(Self::ROOT_INODE),
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
