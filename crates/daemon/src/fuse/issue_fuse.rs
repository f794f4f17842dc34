//! `fuser::Filesystem` over the projection.
//!
//! FUSE callbacks run on fuser's session thread; projection calls are
//! async, so each one is driven to completion with the runtime handle the
//! mount was started with. Results go through [`FileCache`] first.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use fuser::{
    FileAttr, FileType, Filesystem, ReplyAttr, ReplyData, ReplyDirectory, ReplyEmpty, ReplyEntry,
    ReplyOpen, Request,
};
use tokio::runtime::Handle as Runtime;
use tracing::{debug, info, warn};

use common::fs::path;
use common::{DataSource, DirEntry, EntryKind, FsError, IssueFs, Metadata};

use super::cache::{FileCache, FileCacheConfig};
use super::inode_table::InodeTable;

const BLOCK_SIZE: u32 = 512;

/// errno for a projection failure.
pub fn errno(err: &FsError) -> i32 {
    match err {
        FsError::InvalidPath { .. } => libc::EINVAL,
        FsError::NotFound { .. } => libc::ENOENT,
        FsError::NotADirectory { .. } => libc::ENOTDIR,
        FsError::Remote { .. } => libc::EIO,
    }
}

/// Whether `open` flags ask for anything but reading.
pub fn wants_write(flags: i32) -> bool {
    flags & libc::O_ACCMODE != libc::O_RDONLY || flags & libc::O_TRUNC != 0
}

pub struct IssueFuse<S: DataSource> {
    fs: IssueFs<S>,
    runtime: Runtime,
    inodes: InodeTable,
    cache: FileCache,
    ttl: Duration,
    uid: u32,
    gid: u32,
}

impl<S: DataSource> IssueFuse<S> {
    pub fn new(fs: IssueFs<S>, runtime: Runtime, config: FileCacheConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl_secs as u64);
        // SAFETY: getuid and getgid cannot fail
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
        Self {
            fs,
            runtime,
            inodes: InodeTable::new(),
            cache: FileCache::new(config),
            ttl,
            uid,
            gid,
        }
    }

    pub fn fs(&self) -> &IssueFs<S> {
        &self.fs
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    pub fn inodes(&self) -> &InodeTable {
        &self.inodes
    }

    fn path_of(&self, inode: u64) -> Result<String, i32> {
        self.inodes
            .get_path(inode)
            .map(str::to_string)
            .ok_or(libc::ENOENT)
    }

    /// Metadata for a tree path.
    pub fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        if let Some(attr) = self.cache.get_attr(path) {
            return Ok(attr);
        }
        if self.cache.is_negative(path) {
            return Err(FsError::NotFound {
                op: "stat",
                path: path.to_string(),
            });
        }

        let result = self.runtime.block_on(async {
            let mut handle = self.fs.open(path).await?;
            handle.stat().await
        });
        match result {
            Ok(attr) => {
                self.cache.put_attr(path, attr.clone());
                Ok(attr)
            }
            Err(err) => {
                if err.is_not_found() {
                    self.cache.put_negative(path);
                }
                Err(err)
            }
        }
    }

    /// Resolve `name` in the directory `parent`, allocating an inode.
    ///
    /// A name that can never exist in the tree is reported as missing.
    pub fn lookup_child(&mut self, parent: u64, name: &str) -> Result<(u64, Metadata), i32> {
        let dir = self.path_of(parent)?;
        let child = path::join(&dir, name);
        let attr = self.stat(&child).map_err(|e| {
            if e.is_invalid_path() {
                libc::ENOENT
            } else {
                errno(&e)
            }
        })?;
        Ok((self.inodes.get_or_create(&child), attr))
    }

    /// Rendered content of a file, whole.
    pub fn content(&self, path: &str) -> Result<Bytes, FsError> {
        if let Some(data) = self.cache.get_content(path) {
            return Ok(data);
        }
        let data = self.runtime.block_on(async {
            let mut handle = self.fs.open(path).await?;
            let mut buf = Vec::new();
            handle.read_to_end(&mut buf).await?;
            Ok::<_, FsError>(Bytes::from(buf))
        })?;
        self.cache.put_content(path, data.clone());
        Ok(data)
    }

    /// Every entry of a directory.
    pub fn list(&self, path: &str) -> Result<Arc<[DirEntry]>, FsError> {
        if let Some(entries) = self.cache.get_dir(path) {
            return Ok(entries);
        }
        let entries = self.runtime.block_on(async {
            let mut handle = self.fs.open(path).await?;
            handle.read_dir(-1).await
        })?;
        let entries: Arc<[DirEntry]> = Arc::from(entries.entries);
        self.cache.put_dir(path, entries.clone());
        Ok(entries)
    }

    pub fn attr(&self, inode: u64, meta: &Metadata) -> FileAttr {
        let mtime = meta.modified.map(SystemTime::from).unwrap_or(UNIX_EPOCH);
        let (kind, perm, nlink, size) = match meta.kind {
            EntryKind::Directory => (FileType::Directory, 0o555, 2, 0),
            EntryKind::File => (FileType::RegularFile, meta.mode as u16, 1, meta.size),
        };
        FileAttr {
            ino: inode,
            size,
            blocks: size.div_ceil(BLOCK_SIZE as u64),
            atime: mtime,
            mtime,
            ctime: mtime,
            crtime: mtime,
            kind,
            perm,
            nlink,
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: BLOCK_SIZE,
            flags: 0,
        }
    }
}

fn file_type(entry: &DirEntry) -> FileType {
    match entry.kind {
        EntryKind::Directory => FileType::Directory,
        EntryKind::File => FileType::RegularFile,
    }
}

impl<S: DataSource> Filesystem for IssueFuse<S> {
    fn destroy(&mut self) {
        info!(inodes = self.inodes.len(), cache = ?self.cache.stats(), "fuse session ended");
    }

    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let Some(name) = name.to_str() else {
            reply.error(libc::ENOENT);
            return;
        };
        match self.lookup_child(parent, name) {
            Ok((inode, meta)) => {
                let attr = self.attr(inode, &meta);
                reply.entry(&self.ttl, &attr, 0);
            }
            Err(code) => reply.error(code),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, inode: u64, _fh: Option<u64>, reply: ReplyAttr) {
        let path = match self.path_of(inode) {
            Ok(path) => path,
            Err(code) => {
                reply.error(code);
                return;
            }
        };
        match self.stat(&path) {
            Ok(meta) => reply.attr(&self.ttl, &self.attr(inode, &meta)),
            Err(err) => reply.error(errno(&err)),
        }
    }

    fn open(&mut self, _req: &Request<'_>, inode: u64, flags: i32, reply: ReplyOpen) {
        if wants_write(flags) {
            reply.error(libc::EROFS);
            return;
        }
        match self.path_of(inode) {
            Ok(path) => {
                debug!(%path, "fuse open");
                reply.opened(0, 0);
            }
            Err(code) => reply.error(code),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn read(
        &mut self,
        _req: &Request<'_>,
        inode: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let path = match self.path_of(inode) {
            Ok(path) => path,
            Err(code) => {
                reply.error(code);
                return;
            }
        };
        match self.content(&path) {
            Ok(data) => {
                let start = (offset.max(0) as usize).min(data.len());
                let end = start.saturating_add(size as usize).min(data.len());
                reply.data(&data[start..end]);
            }
            Err(err) => {
                warn!(%path, error = %err, "fuse read failed");
                reply.error(errno(&err));
            }
        }
    }

    fn release(
        &mut self,
        _req: &Request<'_>,
        _inode: u64,
        _fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        reply.ok();
    }

    fn opendir(&mut self, _req: &Request<'_>, inode: u64, flags: i32, reply: ReplyOpen) {
        if wants_write(flags) {
            reply.error(libc::EROFS);
            return;
        }
        match self.path_of(inode) {
            Ok(_) => reply.opened(0, 0),
            Err(code) => reply.error(code),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        inode: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let path = match self.path_of(inode) {
            Ok(path) => path,
            Err(code) => {
                reply.error(code);
                return;
            }
        };
        let entries = match self.list(&path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(%path, error = %err, "fuse readdir failed");
                reply.error(errno(&err));
                return;
            }
        };

        let parent = self.inodes.parent(inode).unwrap_or(InodeTable::ROOT_INODE);
        let mut listing = Vec::with_capacity(entries.len() + 2);
        listing.push((inode, FileType::Directory, ".".to_string()));
        listing.push((parent, FileType::Directory, "..".to_string()));
        for entry in entries.iter() {
            let child = self.inodes.get_or_create(&path::join(&path, &entry.name));
            listing.push((child, file_type(entry), entry.name.clone()));
        }

        let start = offset.max(0) as usize;
        for (i, (inode, kind, name)) in listing.into_iter().enumerate().skip(start) {
            // offset of the next entry
            if reply.add(inode, (i + 1) as i64, kind, name) {
                break;
            }
        }
        reply.ok();
    }

    fn releasedir(
        &mut self,
        _req: &Request<'_>,
        _inode: u64,
        _fh: u64,
        _flags: i32,
        reply: ReplyEmpty,
    ) {
        reply.ok();
    }
}
