//! issuefs daemon library: configuration, logging and the FUSE mount.
//!
//! The CLI binary (`issuefs`) is a thin layer over this crate.

#[cfg(feature = "fuse")]
pub mod fuse;
pub mod logging;
pub mod state;

use common::IssueFs;
use jira::{ApiError, JiraClient};

pub use state::{AppConfig, AppState, CacheConfig, StateError};

/// Filesystem over the Jira instance named by `config`.
pub fn connect(config: &AppConfig) -> Result<IssueFs<JiraClient>, ApiError> {
    Ok(IssueFs::new(config.client()?))
}

/// Version string including enabled features, e.g. `issuefs 0.1.0 (fuse)`.
pub fn version() -> String {
    let features: &[&str] = &[
        #[cfg(feature = "fuse")]
        "fuse",
    ];
    if features.is_empty() {
        format!("issuefs {}", env!("CARGO_PKG_VERSION"))
    } else {
        format!("issuefs {} ({})", env!("CARGO_PKG_VERSION"), features.join(", "))
    }
}
