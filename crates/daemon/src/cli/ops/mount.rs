use std::path::PathBuf;

use clap::Args;
use tokio::runtime::Handle;
use tracing::info;

use issuefs_daemon::fuse::{self, FileCacheConfig};

use crate::cli::op::{ConnectError, Op, OpContext};

#[derive(Args, Debug, Clone)]
pub struct Mount {
    /// Existing empty directory to mount the tree on
    pub mountpoint: PathBuf,

    /// Override the configured cache TTL, in seconds
    #[arg(long)]
    pub ttl_secs: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error("mountpoint {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("mount failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("mount task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[async_trait::async_trait]
impl Op for Mount {
    type Error = MountError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        if !self.mountpoint.is_dir() {
            return Err(MountError::NotADirectory(self.mountpoint.clone()));
        }

        let state = ctx.state().map_err(ConnectError::from)?;
        let fs = issuefs_daemon::connect(&state.config).map_err(ConnectError::from)?;
        let mut cache = state.config.cache;
        if let Some(ttl_secs) = self.ttl_secs {
            cache.ttl_secs = ttl_secs;
        }

        info!(url = %state.config.url, "serving issue tree");
        let mountpoint = self.mountpoint.clone();
        let runtime = Handle::current();
        // fuser blocks its thread until unmount and calls back into the runtime
        tokio::task::spawn_blocking(move || {
            fuse::mount(fs, &mountpoint, FileCacheConfig::from(cache), runtime)
        })
        .await??;

        Ok(format!("Unmounted {}", self.mountpoint.display()))
    }
}
