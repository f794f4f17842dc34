//! Composite issue keys, e.g. `TEST-1`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("issue key {0:?}: missing '-' separator")]
    MissingSeparator(String),
    #[error("issue key {0:?}: empty project")]
    EmptyProject(String),
    #[error("issue key {0:?}: issue number must be decimal digits")]
    BadNumber(String),
}

/// The key the tracker API uses to address an issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssueKey {
    pub project: String,
    pub number: String,
}

impl IssueKey {
    pub fn new(project: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            number: number.into(),
        }
    }

    /// Path of the issue file for this key, e.g. `TEST/1/issue`.
    pub fn issue_path(&self) -> String {
        format!("{}/{}/issue", self.project, self.number)
    }
}

/// True if `s` is a non-empty run of ASCII digits.
pub fn is_issue_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for IssueKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (project, number) = s
            .split_once('-')
            .ok_or_else(|| KeyError::MissingSeparator(s.to_string()))?;
        if project.is_empty() {
            return Err(KeyError::EmptyProject(s.to_string()));
        }
        if !is_issue_number(number) {
            return Err(KeyError::BadNumber(s.to_string()));
        }
        Ok(Self::new(project, number))
    }
}

impl TryFrom<String> for IssueKey {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IssueKey> for String {
    fn from(key: IssueKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.project, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let key: IssueKey = "TEST-1".parse().unwrap();
        assert_eq!(key.project, "TEST");
        assert_eq!(key.number, "1");
        assert_eq!(key.to_string(), "TEST-1");
        assert_eq!(key.issue_path(), "TEST/1/issue");
    }

    #[test]
    fn test_splits_on_first_separator() {
        let err = "MY-PROJ-12".parse::<IssueKey>().unwrap_err();
        assert!(matches!(err, KeyError::BadNumber(_)));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(
            "TEST".parse::<IssueKey>(),
            Err(KeyError::MissingSeparator(_))
        ));
        assert!(matches!(
            "-1".parse::<IssueKey>(),
            Err(KeyError::EmptyProject(_))
        ));
        assert!(matches!(
            "TEST-".parse::<IssueKey>(),
            Err(KeyError::BadNumber(_))
        ));
        assert!(matches!(
            "TEST-1a".parse::<IssueKey>(),
            Err(KeyError::BadNumber(_))
        ));
    }

    #[test]
    fn test_is_issue_number() {
        assert!(is_issue_number("42"));
        assert!(!is_issue_number(""));
        assert!(!is_issue_number("4x"));
        assert!(!is_issue_number("issue"));
    }
}
