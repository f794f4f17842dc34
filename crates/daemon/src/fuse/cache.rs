//! TTL cache in front of the projection.
//!
//! The kernel asks for the same attributes and listings many times in a
//! row; every miss here costs an `open` on the projection and usually a
//! round trip to Jira. Entries expire after a TTL so remote edits show up
//! eventually. Content is weighed by size; everything else by count.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use moka::sync::Cache;

use common::{DirEntry, Metadata};

use crate::state::CacheConfig;

#[derive(Debug, Clone)]
pub struct FileCacheConfig {
    /// Upper bound on cached content, in megabytes
    pub max_size_mb: u32,
    /// TTL for attributes and listings
    pub ttl_secs: u32,
    /// TTL for rendered content
    pub content_ttl_secs: u32,
    /// TTL for paths known not to exist
    pub negative_ttl_secs: u32,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self::from(CacheConfig::default())
    }
}

/// Content lives as long as metadata; a stale body with fresh attributes
/// would report the wrong size.
impl From<CacheConfig> for FileCacheConfig {
    fn from(config: CacheConfig) -> Self {
        Self {
            max_size_mb: config.max_size_mb,
            ttl_secs: config.ttl_secs,
            content_ttl_secs: config.ttl_secs,
            negative_ttl_secs: config.ttl_secs.min(10),
        }
    }
}

#[derive(Clone)]
pub struct FileCache {
    content: Cache<String, Bytes>,
    attrs: Cache<String, Metadata>,
    dirs: Cache<String, Arc<[DirEntry]>>,
    negative: Cache<String, ()>,
    config: FileCacheConfig,
}

impl FileCache {
    pub fn new(config: FileCacheConfig) -> Self {
        let metadata_ttl = Duration::from_secs(config.ttl_secs as u64);
        let content_ttl = Duration::from_secs(config.content_ttl_secs as u64);
        let negative_ttl = Duration::from_secs(config.negative_ttl_secs as u64);
        let max_bytes = (config.max_size_mb as u64) * 1024 * 1024;

        Self {
            content: Cache::builder()
                .time_to_live(content_ttl)
                .weigher(|_path: &String, data: &Bytes| -> u32 {
                    data.len().try_into().unwrap_or(u32::MAX)
                })
                .max_capacity(max_bytes)
                .build(),
            attrs: Cache::builder()
                .time_to_live(metadata_ttl)
                .max_capacity(100_000)
                .build(),
            dirs: Cache::builder()
                .time_to_live(metadata_ttl)
                .max_capacity(10_000)
                .build(),
            negative: Cache::builder()
                .time_to_live(negative_ttl)
                .max_capacity(10_000)
                .build(),
            config,
        }
    }

    pub fn get_content(&self, path: &str) -> Option<Bytes> {
        self.content.get(path)
    }

    pub fn put_content(&self, path: &str, data: Bytes) {
        self.content.insert(path.to_string(), data);
    }

    pub fn get_attr(&self, path: &str) -> Option<Metadata> {
        self.attrs.get(path)
    }

    pub fn put_attr(&self, path: &str, attr: Metadata) {
        self.attrs.insert(path.to_string(), attr);
    }

    pub fn get_dir(&self, path: &str) -> Option<Arc<[DirEntry]>> {
        self.dirs.get(path)
    }

    pub fn put_dir(&self, path: &str, entries: Arc<[DirEntry]>) {
        self.dirs.insert(path.to_string(), entries);
    }

    /// Whether `path` was recently confirmed not to exist
    pub fn is_negative(&self, path: &str) -> bool {
        self.negative.contains_key(path)
    }

    pub fn put_negative(&self, path: &str) {
        self.negative.insert(path.to_string(), ());
    }

    pub fn invalidate_all(&self) {
        self.content.invalidate_all();
        self.attrs.invalidate_all();
        self.dirs.invalidate_all();
        self.negative.invalidate_all();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            content_count: self.content.entry_count(),
            content_bytes: self.content.weighted_size(),
            attr_count: self.attrs.entry_count(),
            dir_count: self.dirs.entry_count(),
            negative_count: self.negative.entry_count(),
            max_size_mb: self.config.max_size_mb,
            ttl_secs: self.config.ttl_secs,
        }
    }
}

impl std::fmt::Debug for FileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCache")
            .field("config", &self.config)
            .field("content_count", &self.content.entry_count())
            .field("attr_count", &self.attrs.entry_count())
            .field("dir_count", &self.dirs.entry_count())
            .field("negative_count", &self.negative.entry_count())
            .finish()
    }
}

/// Approximate counts; moka applies writes lazily.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub content_count: u64,
    pub content_bytes: u64,
    pub attr_count: u64,
    pub dir_count: u64,
    pub negative_count: u64,
    pub max_size_mb: u32,
    pub ttl_secs: u32,
}
