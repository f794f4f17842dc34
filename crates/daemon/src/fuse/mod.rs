//! FUSE mount of the issue tree
//!
//! # Architecture
//!
//! - `IssueFuse`: `fuser::Filesystem` implementation over `IssueFs`
//! - `InodeTable`: inode ↔ tree path mapping
//! - `FileCache`: TTL cache of attributes, listings and rendered content
//!
//! The mount is read only: writes fail with `EROFS` and the kernel is told
//! so via `MountOption::RO`.

mod cache;
mod inode_table;
mod issue_fuse;

use std::path::Path;

use fuser::MountOption;
use tokio::runtime::Handle as Runtime;
use tracing::info;

use common::{DataSource, IssueFs};

pub use cache::{CacheStats, FileCache, FileCacheConfig};
pub use inode_table::InodeTable;
pub use issue_fuse::{errno, wants_write, IssueFuse};

/// Mount `fs` at `mountpoint` and serve requests until it is unmounted.
///
/// Blocks the calling thread, which must not be a runtime worker; call it
/// from `spawn_blocking` or a plain thread.
pub fn mount<S: DataSource>(
    fs: IssueFs<S>,
    mountpoint: &Path,
    config: FileCacheConfig,
    runtime: Runtime,
) -> std::io::Result<()> {
    let options = [
        MountOption::RO,
        MountOption::FSName("issuefs".to_string()),
        MountOption::Subtype("issuefs".to_string()),
        MountOption::AutoUnmount,
        MountOption::NoExec,
    ];
    info!(mountpoint = %mountpoint.display(), "mounting");
    fuser::mount2(IssueFuse::new(fs, runtime, config), mountpoint, &options)?;
    info!(mountpoint = %mountpoint.display(), "unmounted");
    Ok(())
}
