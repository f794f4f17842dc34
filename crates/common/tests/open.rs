//! Integration tests for path resolution

mod common;

use ::common::fs::NodeKind;
use ::common::IssueKey;

#[tokio::test]
async fn test_open_existing_paths() {
    let fs = common::setup_test_fs();

    for path in ["TEST", "TEST/1", "TEST/1/issue", "TEST/1/69", "WEB/27"] {
        let handle = fs.open(path).await;
        assert!(handle.is_ok(), "open {}: {:?}", path, handle.err());
    }

    let mut issue = fs.open("TEST/1/issue").await.unwrap();
    assert!(!issue.stat().await.unwrap().is_dir());
    assert_eq!(issue.kind(), NodeKind::IssueFile);

    let mut dir = fs.open("TEST/1").await.unwrap();
    assert!(dir.stat().await.unwrap().is_dir());
    assert_eq!(dir.kind(), NodeKind::IssueDir);
}

#[tokio::test]
async fn test_root_lists_projects_in_order() {
    let fs = common::setup_test_fs();

    let mut root = fs.open(".").await.unwrap();
    let batch = root.read_dir(-1).await.unwrap();
    assert_eq!(common::names(&batch.entries), vec!["TEST", "WEB"]);
    assert!(batch.entries.iter().all(|e| e.is_dir()));

    let stat = root.stat().await.unwrap();
    assert_eq!(stat.name, ".");
    assert_eq!(stat.size, 2);
    assert!(stat.modified.is_none());
}

#[tokio::test]
async fn test_projects_listed_once_per_filesystem() {
    let fs = common::setup_test_fs();

    fs.open(".").await.unwrap();
    fs.open("TEST").await.unwrap();
    fs.open("WEB").await.unwrap();

    assert_eq!(fs.source().calls().projects, 1);
}

#[tokio::test]
async fn test_issue_key_derivation() {
    let fs = common::setup_test_fs();

    let want = IssueKey::new("TEST", "1");
    for path in ["TEST/1/69", "TEST/1/issue", "TEST/1"] {
        let handle = fs.open(path).await.unwrap();
        assert_eq!(handle.issue_key(), Some(want.clone()), "{}", path);
    }
    assert_eq!(want.to_string(), "TEST-1");

    assert_eq!(fs.open("TEST").await.unwrap().issue_key(), None);
    assert_eq!(fs.open(".").await.unwrap().issue_key(), None);
}

#[tokio::test]
async fn test_invalid_paths_never_reach_source() {
    let fs = common::setup_test_fs();

    for path in [
        "..",
        "TEST/..",
        "TEST/../WEB",
        "TEST\\1",
        "TEST/1\\issue",
        "",
        "/TEST",
        "TEST/",
        "TEST//1",
        "./TEST",
    ] {
        let err = fs.open(path).await.unwrap_err();
        assert!(err.is_invalid_path(), "{}: {}", path, err);
    }

    assert_eq!(fs.source().calls().total(), 0);
}

#[tokio::test]
async fn test_missing_issue_costs_one_existence_check() {
    let fs = common::setup_test_fs();

    let err = fs.open("TEST/99").await.unwrap_err();
    assert!(err.is_not_found());

    let calls = fs.source().calls();
    assert_eq!(calls.issue_exists, 1);
    assert_eq!(calls.issue, 0);

    let io: std::io::Error = err.into();
    assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
}

#[tokio::test]
async fn test_missing_segments() {
    let fs = common::setup_test_fs();

    // unknown project: answered from the cached listing
    assert!(fs.open("NOPE").await.unwrap_err().is_not_found());
    assert!(fs.open("NOPE/1").await.unwrap_err().is_not_found());
    // not an issue number
    assert!(fs.open("TEST/abc").await.unwrap_err().is_not_found());
    assert_eq!(fs.source().calls().issue_exists, 0);

    // unknown comment
    assert!(fs.open("TEST/1/12345").await.unwrap_err().is_not_found());
    assert_eq!(fs.source().calls().comment_exists, 1);

    // nothing below a file
    assert!(fs.open("TEST/1/issue/x").await.unwrap_err().is_not_found());
    assert!(fs.open("TEST/1/69/x").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_listed_children_resolve_without_existence_check() {
    let fs = common::setup_test_fs();

    let mut project = fs.open("TEST").await.unwrap();
    project.read_dir(-1).await.unwrap();
    let mut dir = fs.open("TEST/1").await.unwrap();
    dir.read_dir(-1).await.unwrap();
    let before = fs.source().calls();
    assert_eq!(before.issue_exists, 0);

    let mut comment = fs.open("TEST/1/69").await.unwrap();
    let mut buf = Vec::new();
    comment.read_to_end(&mut buf).await.unwrap();

    // resolution is free; the content itself is fetched for this handle
    let after = fs.source().calls();
    assert_eq!(after.issue_exists, 0);
    assert_eq!(after.comment_exists, 0);
    assert_eq!(after.comment, before.comment + 1);
    assert!(String::from_utf8(buf).unwrap().contains("turning it off"));
}

#[tokio::test]
async fn test_issue_added_after_listing_is_reachable() {
    let fs = common::setup_test_fs();

    let mut project = fs.open("TEST").await.unwrap();
    assert_eq!(project.read_dir(-1).await.unwrap().entries.len(), 2);

    fs.source()
        .add_issue(::common::testkit::issue("TEST-3", "New", Vec::new()));
    assert!(fs.open("TEST/3").await.is_ok());
    assert_eq!(fs.source().calls().issue_exists, 1);
}

#[tokio::test]
async fn test_open_failure_is_remote_error() {
    let fs = common::setup_test_fs();
    fs.source().set_offline(true);

    let err = fs.open("TEST").await.unwrap_err();
    assert!(matches!(err, ::common::FsError::Remote { op: "open", .. }));
    assert_eq!(err.path(), "TEST");

    // nothing was cached by the failure
    fs.source().set_offline(false);
    assert!(fs.open("TEST").await.is_ok());
    assert_eq!(fs.source().calls().projects, 2);
}
