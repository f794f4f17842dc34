use std::fmt::Debug;

use async_trait::async_trait;

use crate::model::{Comment, Issue, Project};

/// The remote side of the projection.
///
/// Implementations own transport, pagination, authentication and retry
/// policy. Every failure is surfaced to the filesystem caller as-is.
#[async_trait]
pub trait DataSource: Send + Sync + Debug + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// List every project visible to the caller, in display order.
    async fn projects(&self) -> Result<Vec<Project>, Self::Error>;

    async fn project(&self, key: &str) -> Result<Project, Self::Error>;

    /// List the issues of a project, in display order.
    async fn issues(&self, project: &str) -> Result<Vec<Issue>, Self::Error>;

    /// Cheap presence check for an issue, without fetching its body.
    ///
    /// # Arguments
    /// * `key` - Composite issue key, e.g. `TEST-1`
    async fn issue_exists(&self, key: &str) -> Result<bool, Self::Error>;

    /// Fetch an issue, including its comments.
    async fn issue(&self, key: &str) -> Result<Issue, Self::Error>;

    async fn comment_exists(&self, issue: &str, id: &str) -> Result<bool, Self::Error>;

    async fn comment(&self, issue: &str, id: &str) -> Result<Comment, Self::Error>;
}
