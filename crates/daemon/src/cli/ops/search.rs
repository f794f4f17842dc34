use std::fmt;

use clap::Args;

use common::render;
use jira::ApiError;

use crate::cli::op::ConnectError;

#[derive(Args, Debug, Clone)]
pub struct Search {
    /// JQL query, e.g. 'project = TEST AND status = Open'
    pub jql: String,
}

/// One line per match: the issue's path in the tree and its summary.
#[derive(Debug)]
pub struct SearchOutput {
    pub listing: String,
}

impl fmt::Display for SearchOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.listing.is_empty() {
            return write!(f, "No issues found");
        }
        write!(f, "{}", self.listing.trim_end_matches('\n'))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error("search failed: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Search {
    type Error = SearchError;
    type Output = SearchOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().map_err(ConnectError::from)?;
        let client = state.config.client().map_err(ConnectError::from)?;

        let issues = client.search(&self.jql).await?;
        Ok(SearchOutput {
            listing: render::print_issues(&issues),
        })
    }
}
