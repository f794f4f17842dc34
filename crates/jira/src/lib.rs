//! Jira REST v2 data source.
//!
//! [`JiraClient`] implements [`common::DataSource`] over HTTP. Records are
//! fetched with `GET`; existence checks use `HEAD` so validating a path
//! never downloads a body.
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use common::IssueFs;
//! use jira::JiraClient;
//!
//! let root = url::Url::parse("https://jira.example.com/rest/api/2")?;
//! let client = JiraClient::new(&root)?.with_basic_auth("alice", "secret");
//! let fs = IssueFs::new(client);
//!
//! let mut buf = Vec::new();
//! fs.open("TEST/1/issue").await?.read_to_end(&mut buf).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod wire;

pub use client::{Credentials, JiraClient};
pub use error::ApiError;
