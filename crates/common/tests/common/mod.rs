//! Shared setup for projection tests

#![allow(dead_code)]

use ::common::testkit::{self, MemorySource};
use ::common::IssueFs;

/// Filesystem over the sample tracker: TEST (TEST-1 with comments 69 and
/// 70, TEST-2) and WEB (WEB-27).
pub fn setup_test_fs() -> IssueFs<MemorySource> {
    init_tracing();
    IssueFs::new(testkit::sample())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub fn names(entries: &[::common::DirEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.name.as_str()).collect()
}
