use std::fmt::{self, Write};
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, TimeDelta, Utc};
use clap::Args;
use regex::Regex;

use common::render::{print_comment, print_issue};
use common::{DataSource, Issue, IssueKey, KeyError};
use jira::ApiError;

use crate::cli::op::ConnectError;

/// One `<count><unit>` term of a duration such as `1d12h`.
static DURATION_TERM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)([wdhms])").unwrap());

#[derive(Args, Debug, Clone)]
pub struct Export {
    /// Leave out issues and comments not modified within this long,
    /// e.g. 24h, 7d or 1d12h
    #[arg(short = 'd', long = "since", default_value = "7d", value_parser = parse_duration)]
    pub since: TimeDelta,

    /// Issue keys, e.g. TEST-1
    #[arg(required = true)]
    pub keys: Vec<String>,
}

/// Matching issues and comments as a sequence of mail messages.
#[derive(Debug)]
pub struct ExportOutput {
    pub mbox: String,
}

impl fmt::Display for ExportOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mbox.trim_end_matches('\n'))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error("bad issue key: {0}")]
    Key(#[from] KeyError),
    #[error("fetch {key}: {source}")]
    Api {
        key: String,
        #[source]
        source: ApiError,
    },
}

/// Parse a duration made of `<count><unit>` terms, units being w, d, h, m
/// and s.
pub fn parse_duration(s: &str) -> Result<TimeDelta, String> {
    let s = s.trim();
    let mut total = TimeDelta::zero();
    let mut consumed = 0;
    for caps in DURATION_TERM_REGEX.captures_iter(s) {
        let whole = &caps[0];
        let start = caps.get(0).map(|m| m.start()).unwrap_or_default();
        if start != consumed {
            return Err(format!("invalid duration {:?}", s));
        }
        consumed += whole.len();

        let count: i64 = caps[1]
            .parse()
            .map_err(|_| format!("duration {:?} out of range", s))?;
        let term = match &caps[2] {
            "w" => TimeDelta::try_weeks(count),
            "d" => TimeDelta::try_days(count),
            "h" => TimeDelta::try_hours(count),
            "m" => TimeDelta::try_minutes(count),
            _ => TimeDelta::try_seconds(count),
        };
        total = term
            .and_then(|t| total.checked_add(&t))
            .ok_or_else(|| format!("duration {:?} out of range", s))?;
    }
    if s.is_empty() || consumed != s.len() {
        return Err(format!("invalid duration {:?}", s));
    }
    Ok(total)
}

/// Append `message` to `mbox` under an mbox separator line.
fn push_message(mbox: &mut String, modified: &DateTime<Utc>, message: &str) {
    let _ = writeln!(mbox, "From nobody {}", modified.format("%a %b %e %H:%M:%S %Y"));
    mbox.push_str(message);
    mbox.push('\n');
}

/// The issue and each of its comments modified after `cutoff`, as mail
/// messages. Comments are judged on their own times, not the issue's.
pub fn export_issue(issue: &Issue, cutoff: DateTime<Utc>) -> String {
    let mut mbox = String::new();
    if issue.updated > cutoff {
        push_message(&mut mbox, &issue.updated, &print_issue(issue));
    }
    for comment in &issue.comments {
        let modified = comment.modified();
        if modified > cutoff {
            push_message(&mut mbox, &modified, &print_comment(comment));
        }
    }
    mbox
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Export {
    type Error = ExportError;
    type Output = ExportOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let keys = self
            .keys
            .iter()
            .map(|k| IssueKey::from_str(k.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        let state = ctx.state().map_err(ConnectError::from)?;
        let client = state.config.client().map_err(ConnectError::from)?;

        let cutoff = Utc::now()
            .checked_sub_signed(self.since)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut mbox = String::new();
        for key in keys {
            let key = key.to_string();
            let issue = match client.issue(&key).await {
                Ok(issue) => issue,
                Err(source) => return Err(ExportError::Api { key, source }),
            };
            tracing::debug!(key = %key, cutoff = %cutoff, "export");
            mbox.push_str(&export_issue(&issue, cutoff));
        }

        Ok(ExportOutput { mbox })
    }
}
