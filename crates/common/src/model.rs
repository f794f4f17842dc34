//! Plain records mirroring the tracker's resources.
//!
//! These are decoded from the wire by a data source and rendered to text by
//! [`crate::render`]. They carry no behaviour beyond naming helpers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    /// Short key, e.g. `TEST`. Used as the top-level directory name.
    pub key: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name
    pub name: String,
    pub display_name: String,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.display_name.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}", self.display_name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub url: String,
    pub body: String,
    pub author: User,
    pub update_author: Option<User>,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl Comment {
    /// Time of the last edit, or creation if never edited.
    pub fn modified(&self) -> DateTime<Utc> {
        self.updated.unwrap_or(self.created)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    /// Composite key, e.g. `TEST-1`
    pub key: String,
    /// API URL of the issue
    pub url: String,
    pub summary: String,
    pub description: Option<String>,
    pub status: String,
    pub reporter: User,
    pub assignee: Option<User>,
    /// Key of the owning project
    pub project: String,
    /// Keys of linked issues
    pub links: Vec<String>,
    /// Keys of subtasks
    pub subtasks: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub comments: Vec<Comment>,
}

impl Issue {
    /// Directory name of the issue: the number part of its key.
    pub fn name(&self) -> &str {
        match self.key.split_once('-') {
            Some((_, number)) => number,
            None => &self.key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn issue(key: &str) -> Issue {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        Issue {
            id: "10000".into(),
            key: key.into(),
            url: String::new(),
            summary: String::new(),
            description: None,
            status: "Open".into(),
            reporter: User::default(),
            assignee: None,
            project: "TEST".into(),
            links: vec![],
            subtasks: vec![],
            created: t,
            updated: t,
            comments: vec![],
        }
    }

    #[test]
    fn test_issue_name() {
        assert_eq!(issue("TEST-1").name(), "1");
        assert_eq!(issue("NOKEY").name(), "NOKEY");
    }

    #[test]
    fn test_user_display() {
        let named = User {
            name: "otl".into(),
            display_name: "Oliver Lowe".into(),
        };
        assert_eq!(named.to_string(), "Oliver Lowe");
        let bare = User {
            name: "otl".into(),
            display_name: String::new(),
        };
        assert_eq!(bare.to_string(), "otl");
    }
}
