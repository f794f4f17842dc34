use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;

use common::fs::path;
use common::{FsError, Metadata};

use crate::cli::op::ConnectError;

#[derive(Args, Debug, Clone)]
pub struct Stat {
    /// Path to describe, e.g. TEST/1
    pub path: String,
}

#[derive(Debug)]
pub struct StatOutput {
    pub path: String,
    pub meta: Metadata,
}

impl fmt::Display for StatOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.path.bold())?;
        let kind = if self.meta.is_dir() { "directory" } else { "file" };
        writeln!(f, "  {} {}", "Type:".dimmed(), kind)?;
        if self.meta.is_dir() {
            writeln!(f, "  {} {}", "Entries:".dimmed(), self.meta.size)?;
        } else {
            writeln!(f, "  {} {} bytes", "Size:".dimmed(), self.meta.size)?;
        }
        writeln!(f, "  {} {:o}", "Mode:".dimmed(), self.meta.mode)?;
        let modified = match self.meta.modified {
            Some(t) => t.to_rfc3339(),
            None => "unknown".to_string(),
        };
        write!(f, "  {} {}", "Modified:".dimmed(), modified)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Fs(#[from] FsError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Stat {
    type Error = StatError;
    type Output = StatOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let fs = ctx.connect()?;
        let path = path::normalize(&self.path);

        let mut handle = fs.open(&path).await?;
        let meta = handle.stat().await?;
        Ok(StatOutput { path, meta })
    }
}
