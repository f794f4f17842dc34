use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use clap::Args;
use regex::Regex;

use common::fs::path;
use common::{FsError, IssueKey};

use crate::cli::op::ConnectError;

/// Bare issue keys as Jira prints them, e.g. `TEST-1`.
static ISSUE_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*-\d+$").unwrap());

#[derive(Args, Debug, Clone)]
pub struct Cat {
    /// File to print, e.g. TEST/1/issue or TEST/1/69; an issue key such as
    /// TEST-1 prints that issue
    pub target: String,
}

#[derive(Debug)]
pub struct CatOutput {
    pub content: String,
}

impl fmt::Display for CatOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // rendered files already end in a newline
        write!(f, "{}", self.content.trim_end_matches('\n'))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Tree path for a `cat` argument: issue keys expand to their issue file,
/// anything else is taken as a path.
pub fn resolve_target(target: &str) -> String {
    let target = target.trim();
    if ISSUE_KEY_REGEX.is_match(target) {
        if let Ok(key) = IssueKey::from_str(target) {
            return key.issue_path();
        }
    }
    path::normalize(target)
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Cat {
    type Error = CatError;
    type Output = CatOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let fs = ctx.connect()?;
        let target = resolve_target(&self.target);

        let mut handle = fs.open(&target).await?;
        let mut buf = Vec::new();
        handle.read_to_end(&mut buf).await?;

        Ok(CatOutput {
            content: String::from_utf8_lossy(&buf).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_issue_key() {
        assert_eq!(resolve_target("TEST-1"), "TEST/1/issue");
        assert_eq!(resolve_target(" WEB_2-27 "), "WEB_2/27/issue");
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_target("TEST/1/69"), "TEST/1/69");
        assert_eq!(resolve_target("/TEST/1/issue"), "TEST/1/issue");
        assert_eq!(resolve_target("/"), ".");
        // lower case keys are not Jira keys; left for open to reject
        assert_eq!(resolve_target("test-1"), "test-1");
    }
}
