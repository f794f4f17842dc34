use std::fmt;

use clap::Args;
use comfy_table::Table;

use common::fs::path;
use common::{DirEntry, FsError, Metadata};

use crate::cli::op::ConnectError;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Directory to list, e.g. TEST or TEST/1 (defaults to the root)
    pub path: Option<String>,

    /// Show size and modification time of each entry
    #[arg(short, long)]
    pub long: bool,
}

#[derive(Debug)]
pub enum LsOutput {
    Short(Vec<DirEntry>),
    Long(Vec<Metadata>),
}

impl fmt::Display for LsOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LsOutput::Short(entries) => {
                if entries.is_empty() {
                    return write!(f, "No items found");
                }
                let lines: Vec<String> = entries.iter().map(ToString::to_string).collect();
                write!(f, "{}", lines.join("\n"))
            }
            LsOutput::Long(items) => {
                if items.is_empty() {
                    return write!(f, "No items found");
                }
                let mut table = Table::new();
                table.set_header(vec!["TYPE", "NAME", "SIZE", "MODIFIED"]);
                for item in items {
                    let type_str = if item.is_dir() { "dir" } else { "file" };
                    let modified = item
                        .modified
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    table.add_row(vec![
                        type_str.to_string(),
                        item.name.clone(),
                        item.size.to_string(),
                        modified,
                    ]);
                }
                write!(f, "{table}")
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Fs(#[from] FsError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = LsError;
    type Output = LsOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let fs = ctx.connect()?;
        let dir = path::normalize(self.path.as_deref().unwrap_or(path::ROOT));

        let mut handle = fs.open(&dir).await?;
        let entries = handle.read_dir(-1).await?.entries;
        if !self.long {
            return Ok(LsOutput::Short(entries));
        }

        // an issue directory listing already describes its files
        let mut items = Vec::with_capacity(entries.len());
        for entry in &entries {
            if let Some(stat) = handle.child_stat(&entry.name) {
                items.push(stat.clone());
                continue;
            }
            let mut child = fs.open(&path::join(&dir, &entry.name)).await?;
            items.push(child.stat().await?);
        }
        Ok(LsOutput::Long(items))
    }
}
