//! In-memory data source for tests.
//!
//! Counts calls per operation so tests can assert how many round trips an
//! operation cost, and can be taken offline to exercise failure paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;

use crate::model::{Comment, Issue, Project, User};
use crate::source::DataSource;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("data source offline")]
    Offline,
}

/// Snapshot of per-operation call counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calls {
    pub projects: usize,
    pub project: usize,
    pub issues: usize,
    pub issue_exists: usize,
    pub issue: usize,
    pub comment_exists: usize,
    pub comment: usize,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.projects
            + self.project
            + self.issues
            + self.issue_exists
            + self.issue
            + self.comment_exists
            + self.comment
    }
}

#[derive(Debug, Default)]
struct Counters {
    projects: AtomicUsize,
    project: AtomicUsize,
    issues: AtomicUsize,
    issue_exists: AtomicUsize,
    issue: AtomicUsize,
    comment_exists: AtomicUsize,
    comment: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

#[derive(Debug, Default)]
pub struct MemorySource {
    projects: RwLock<Vec<Project>>,
    issues: RwLock<Vec<Issue>>,
    counters: Counters,
    offline: AtomicBool,
    latency: Option<Duration>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call, to widen race windows in concurrency tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_project(self, key: &str) -> Self {
        self.add_project(key);
        self
    }

    pub fn with_issue(self, issue: Issue) -> Self {
        self.add_issue(issue);
        self
    }

    pub fn add_project(&self, key: &str) {
        let mut projects = self.projects.write();
        let id = 10000 + projects.len();
        projects.push(Project {
            id: id.to_string(),
            key: key.to_string(),
            url: format!("https://jira.example.com/rest/api/2/project/{}", key),
        });
    }

    pub fn add_issue(&self, issue: Issue) {
        self.issues.write().push(issue);
    }

    /// Edit a stored issue in place, as if changed on the server.
    pub fn update_issue(&self, key: &str, edit: impl FnOnce(&mut Issue)) {
        if let Some(issue) = self.issues.write().iter_mut().find(|i| i.key == key) {
            edit(issue);
        }
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Calls {
        let c = &self.counters;
        Calls {
            projects: c.projects.load(Ordering::SeqCst),
            project: c.project.load(Ordering::SeqCst),
            issues: c.issues.load(Ordering::SeqCst),
            issue_exists: c.issue_exists.load(Ordering::SeqCst),
            issue: c.issue.load(Ordering::SeqCst),
            comment_exists: c.comment_exists.load(Ordering::SeqCst),
            comment: c.comment.load(Ordering::SeqCst),
        }
    }

    async fn enter(&self, counter: &AtomicUsize) -> Result<(), MemoryError> {
        bump(counter);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(MemoryError::Offline);
        }
        Ok(())
    }

    fn find_issue(&self, key: &str) -> Option<Issue> {
        self.issues.read().iter().find(|i| i.key == key).cloned()
    }
}

#[async_trait]
impl DataSource for MemorySource {
    type Error = MemoryError;

    async fn projects(&self) -> Result<Vec<Project>, Self::Error> {
        self.enter(&self.counters.projects).await?;
        Ok(self.projects.read().clone())
    }

    async fn project(&self, key: &str) -> Result<Project, Self::Error> {
        self.enter(&self.counters.project).await?;
        self.projects
            .read()
            .iter()
            .find(|p| p.key == key)
            .cloned()
            .ok_or_else(|| MemoryError::NotFound(key.to_string()))
    }

    async fn issues(&self, project: &str) -> Result<Vec<Issue>, Self::Error> {
        self.enter(&self.counters.issues).await?;
        Ok(self
            .issues
            .read()
            .iter()
            .filter(|i| i.project == project)
            .cloned()
            .collect())
    }

    async fn issue_exists(&self, key: &str) -> Result<bool, Self::Error> {
        self.enter(&self.counters.issue_exists).await?;
        Ok(self.find_issue(key).is_some())
    }

    async fn issue(&self, key: &str) -> Result<Issue, Self::Error> {
        self.enter(&self.counters.issue).await?;
        self.find_issue(key)
            .ok_or_else(|| MemoryError::NotFound(key.to_string()))
    }

    async fn comment_exists(&self, issue: &str, id: &str) -> Result<bool, Self::Error> {
        self.enter(&self.counters.comment_exists).await?;
        Ok(self
            .find_issue(issue)
            .is_some_and(|i| i.comments.iter().any(|c| c.id == id)))
    }

    async fn comment(&self, issue: &str, id: &str) -> Result<Comment, Self::Error> {
        self.enter(&self.counters.comment).await?;
        self.find_issue(issue)
            .and_then(|i| i.comments.into_iter().find(|c| c.id == id))
            .ok_or_else(|| MemoryError::NotFound(format!("{}/{}", issue, id)))
    }
}

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn user(name: &str) -> User {
    User {
        name: name.to_string(),
        display_name: String::new(),
    }
}

pub fn comment(id: &str, body: &str) -> Comment {
    Comment {
        id: id.to_string(),
        url: String::new(),
        body: body.to_string(),
        author: user("alice"),
        update_author: None,
        created: at(2),
        updated: None,
    }
}

pub fn issue(key: &str, summary: &str, comments: Vec<Comment>) -> Issue {
    let project = key.split_once('-').map(|(p, _)| p).unwrap_or(key);
    Issue {
        id: String::new(),
        key: key.to_string(),
        url: format!("https://jira.example.com/rest/api/2/issue/{}", key),
        summary: summary.to_string(),
        description: Some(format!("Description of {}.", key)),
        status: "Open".to_string(),
        reporter: user("bob"),
        assignee: None,
        project: project.to_string(),
        links: Vec::new(),
        subtasks: Vec::new(),
        created: at(1),
        updated: at(3),
        comments,
    }
}

/// Two projects: TEST with TEST-1 (comments 69, 70) and TEST-2, and WEB
/// with WEB-27.
pub fn sample() -> MemorySource {
    MemorySource::new()
        .with_project("TEST")
        .with_project("WEB")
        .with_issue(issue(
            "TEST-1",
            "Printer on fire",
            vec![
                comment("69", "Have you tried turning it off and on again?"),
                comment("70", "Yes."),
            ],
        ))
        .with_issue(issue("TEST-2", "Coffee machine empty", Vec::new()))
        .with_issue(issue("WEB-27", "Broken link on home page", Vec::new()))
}
