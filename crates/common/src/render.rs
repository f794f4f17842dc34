//! Text rendering of issues and comments.
//!
//! Output is mail-like: a block of `Header: value` lines, a blank line,
//! then the body. Rendering is deterministic so rendered sizes can be
//! reported by `stat` before a read.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use url::Url;

use crate::model::{Comment, Issue};

/// Width of the body excerpt in an issue's comment listing.
const COMMENT_SUMMARY_LEN: usize = 36;

/// RFC 1123 with numeric zone, e.g. `Mon, 02 Jan 2006 15:04:05 -0700`.
const DATE_HEADER: &str = "%a, %d %b %Y %H:%M:%S %z";
const DATE_LISTING: &str = "%Y-%m-%d %H:%M:%S";

fn date_header(t: &DateTime<Utc>) -> String {
    t.format(DATE_HEADER).to_string()
}

/// Human-facing URL of an issue, derived from its API URL.
fn browse_url(issue: &Issue) -> Option<Url> {
    let mut u = Url::parse(&issue.url).ok()?;
    u.set_path(&format!("browse/{}", issue.key));
    u.set_query(None);
    Some(u)
}

pub fn print_issue(issue: &Issue) -> String {
    let mut buf = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(buf, "From: {}", issue.reporter);
    let _ = writeln!(buf, "Date: {}", date_header(&issue.created));
    if let Some(assignee) = issue.assignee.as_ref() {
        let assignee = assignee.to_string();
        if !assignee.is_empty() {
            let _ = writeln!(buf, "Assignee: {}", assignee);
        }
    }
    if let Some(u) = browse_url(issue) {
        let _ = writeln!(buf, "Archived-At: <{}>", u);
    }
    let _ = writeln!(buf, "Archived-At: <{}>", issue.url);
    let _ = writeln!(buf, "Status: {}", issue.status);
    if !issue.links.is_empty() {
        let _ = writeln!(buf, "References: {}", issue.links.join(", "));
    }
    if !issue.subtasks.is_empty() {
        let _ = writeln!(buf, "Subtasks: {}", issue.subtasks.join(", "));
    }
    let _ = writeln!(buf, "Subject: {}", issue.summary);
    buf.push('\n');

    if let Some(description) = issue.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(buf, "{}", description.replace('\r', ""));
    }
    if issue.comments.is_empty() {
        return buf;
    }
    buf.push('\n');
    for c in &issue.comments {
        let _ = writeln!(
            buf,
            "{}\t{}\t{} ({})",
            c.id,
            summarise(&c.body, COMMENT_SUMMARY_LEN),
            c.author.name,
            c.modified().format(DATE_LISTING)
        );
    }
    buf
}

pub fn print_comment(comment: &Comment) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, "From: {}", comment.author);
    let _ = writeln!(buf, "Date: {}", date_header(&comment.modified()));
    buf.push('\n');
    let _ = writeln!(buf, "{}", comment.body.trim());
    buf
}

/// One line per issue: the path of its issue file and its summary.
pub fn print_issues(issues: &[Issue]) -> String {
    let mut buf = String::new();
    for issue in issues {
        let name = issue.key.replacen('-', "/", 1);
        let _ = writeln!(buf, "{}/issue\t{}", name, issue.summary);
    }
    buf
}

/// Single-line excerpt of `body`, at most `length` bytes plus an ellipsis.
pub fn summarise(body: &str, length: usize) -> String {
    if body.len() < length {
        return body.replace('\n', " ").trim().to_string();
    }
    let mut end = length;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    let excerpt = body[..end].replace('\r', "").replace('\n', " ");
    let excerpt = excerpt.trim().replace("  ", " ");
    format!("{}...", excerpt)
}
