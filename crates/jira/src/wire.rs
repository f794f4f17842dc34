//! JSON shapes returned by the Jira REST API, and their conversion into
//! the shared records.
//!
//! Issue fields live under `fields`; comments under
//! `fields.comment.comments`. Timestamps look like
//! `2024-01-02T15:04:05.000+0000`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use common::{Comment, Issue, Project, User};

use crate::error::ApiError;

const TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

fn timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_str(value, TIMESTAMP)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| ApiError::Timestamp {
            field,
            value: value.to_string(),
            source,
        })
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProjectWire {
    #[serde(default)]
    pub id: String,
    pub key: String,
    #[serde(rename = "self", default)]
    pub url: String,
}

impl From<ProjectWire> for Project {
    fn from(p: ProjectWire) -> Self {
        Project {
            id: p.id,
            key: p.key,
            url: p.url,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserWire {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

impl From<UserWire> for User {
    fn from(u: UserWire) -> Self {
        User {
            name: u.name,
            display_name: u.display_name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentWire {
    pub id: String,
    #[serde(rename = "self", default)]
    pub url: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: UserWire,
    pub update_author: Option<UserWire>,
    pub created: String,
    pub updated: Option<String>,
}

impl TryFrom<CommentWire> for Comment {
    type Error = ApiError;

    fn try_from(c: CommentWire) -> Result<Self, Self::Error> {
        let created = timestamp("created", &c.created)?;
        let updated = match c.updated.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => Some(timestamp("updated", s)?),
            None => None,
        };
        Ok(Comment {
            id: c.id,
            url: c.url,
            body: c.body,
            author: c.author.into(),
            update_author: c.update_author.map(User::from),
            created,
            updated,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IssueWire {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "self", default)]
    pub url: String,
    pub key: String,
    pub fields: FieldsWire,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FieldsWire {
    #[serde(default)]
    pub summary: String,
    pub description: Option<String>,
    pub status: Option<StatusWire>,
    pub reporter: Option<UserWire>,
    pub assignee: Option<UserWire>,
    pub project: Option<ProjectWire>,
    #[serde(default)]
    pub issuelinks: Vec<LinkWire>,
    #[serde(default)]
    pub subtasks: Vec<KeyRef>,
    pub created: String,
    pub updated: String,
    pub comment: Option<CommentPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatusWire {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct KeyRef {
    pub key: String,
}

/// A link points one way or the other; only the far end is kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LinkWire {
    pub inward_issue: Option<KeyRef>,
    pub outward_issue: Option<KeyRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CommentPage {
    #[serde(default)]
    pub comments: Vec<CommentWire>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResults {
    #[serde(default)]
    pub issues: Vec<IssueWire>,
}

impl TryFrom<IssueWire> for Issue {
    type Error = ApiError;

    fn try_from(is: IssueWire) -> Result<Self, Self::Error> {
        let f = is.fields;
        let created = timestamp("created", &f.created)?;
        let updated = timestamp("updated", &f.updated)?;
        let comments = f
            .comment
            .unwrap_or_default()
            .comments
            .into_iter()
            .map(Comment::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let project = match f.project {
            Some(p) => p.key,
            None => is
                .key
                .split_once('-')
                .map(|(p, _)| p.to_string())
                .unwrap_or_default(),
        };
        let links = f
            .issuelinks
            .into_iter()
            .filter_map(|l| l.outward_issue.or(l.inward_issue))
            .map(|k| k.key)
            .collect();

        Ok(Issue {
            id: is.id,
            key: is.key,
            url: is.url,
            summary: f.summary,
            description: f.description,
            status: f.status.map(|s| s.name).unwrap_or_default(),
            reporter: f.reporter.unwrap_or_default().into(),
            assignee: f.assignee.map(User::from),
            project,
            links,
            subtasks: f.subtasks.into_iter().map(|k| k.key).collect(),
            created,
            updated,
            comments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp() {
        let t = timestamp("created", "2024-01-02T15:04:05.123+1000").unwrap();
        assert_eq!(
            t,
            Utc.with_ymd_and_hms(2024, 1, 2, 5, 4, 5).unwrap()
                + chrono::Duration::milliseconds(123)
        );

        let err = timestamp("updated", "yesterday").unwrap_err();
        assert!(err.to_string().starts_with("bad updated timestamp"));
    }

    #[test]
    fn test_issue_from_json() {
        let raw = r#"{
            "id": "10001",
            "self": "https://jira.example.com/rest/api/2/issue/10001",
            "key": "TEST-1",
            "fields": {
                "summary": "Printer on fire",
                "description": null,
                "status": {"name": "In Progress"},
                "reporter": {"name": "bob", "displayName": "Bob"},
                "assignee": null,
                "issuelinks": [
                    {"outwardIssue": {"key": "TEST-2"}},
                    {"inwardIssue": {"key": "WEB-7"}}
                ],
                "subtasks": [{"key": "TEST-3"}],
                "created": "2024-01-02T15:04:05.000+0000",
                "updated": "2024-01-03T00:00:00.000+0000",
                "comment": {"comments": [{
                    "id": "69",
                    "self": "https://jira.example.com/rest/api/2/issue/10001/comment/69",
                    "body": "Have you tried turning it off?",
                    "author": {"name": "alice"},
                    "created": "2024-03-01T09:30:00.000+0000",
                    "updated": "2024-03-01T09:30:00.000+0000"
                }]}
            }
        }"#;
        let wire: IssueWire = serde_json::from_str(raw).unwrap();
        let issue = Issue::try_from(wire).unwrap();

        assert_eq!(issue.key, "TEST-1");
        assert_eq!(issue.name(), "1");
        assert_eq!(issue.project, "TEST");
        assert_eq!(issue.status, "In Progress");
        assert_eq!(issue.reporter.to_string(), "Bob");
        assert!(issue.assignee.is_none());
        assert!(issue.description.is_none());
        assert_eq!(issue.links, vec!["TEST-2", "WEB-7"]);
        assert_eq!(issue.subtasks, vec!["TEST-3"]);
        assert_eq!(issue.comments.len(), 1);
        assert_eq!(issue.comments[0].author.name, "alice");
    }
}
