//! Path syntax.
//!
//! Paths are unrooted and slash separated, e.g. `TEST/1/issue`. The single
//! name `.` denotes the root. Validation happens before anything is fetched.

/// Name of the root directory.
pub const ROOT: &str = ".";

/// Characters that are never part of a valid name.
const RESERVED: &[char] = &['\\', ':', '\0'];

/// Whether `path` is acceptable to `open`.
///
/// Rejects leading or trailing slashes, empty segments, `.` and `..`
/// segments (other than the bare root), and reserved characters.
pub fn is_valid(path: &str) -> bool {
    if path == ROOT {
        return true;
    }
    if path.is_empty() || path.contains(RESERVED) {
        return false;
    }
    path.split('/')
        .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// Split a valid, non-root path into its segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Convert user input such as `/TEST/1/` into the form `open` expects.
///
/// Only surrounding slashes are trimmed; anything else is left for
/// [`is_valid`] to judge.
pub fn normalize(path: &str) -> String {
    let path = path.trim();
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return ROOT.to_string();
    }
    trimmed.to_string()
}

/// Join a child name onto a directory path.
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT || dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert!(is_valid("."));
        assert!(is_valid("TEST"));
        assert!(is_valid("TEST/1"));
        assert!(is_valid("TEST/1/issue"));
        assert!(is_valid("TEST/1/69"));
    }

    #[test]
    fn test_invalid_paths() {
        assert!(!is_valid(""));
        assert!(!is_valid("/TEST"));
        assert!(!is_valid("TEST/"));
        assert!(!is_valid("TEST//1"));
        assert!(!is_valid("./TEST"));
        assert!(!is_valid("TEST/./1"));
        assert!(!is_valid(".."));
        assert!(!is_valid("TEST/../WEB"));
        assert!(!is_valid("TEST\\1"));
        assert!(!is_valid("C:TEST"));
        assert!(!is_valid("TEST/\0"));
    }

    #[test]
    fn test_segments() {
        assert_eq!(
            segments("TEST/1/issue").collect::<Vec<_>>(),
            vec!["TEST", "1", "issue"]
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), ".");
        assert_eq!(normalize("/"), ".");
        assert_eq!(normalize("/TEST/1/"), "TEST/1");
        assert_eq!(normalize("TEST"), "TEST");
        assert_eq!(normalize(" TEST/1 "), "TEST/1");
    }

    #[test]
    fn test_join() {
        assert_eq!(join(".", "TEST"), "TEST");
        assert_eq!(join("TEST", "1"), "TEST/1");
        assert_eq!(join("TEST/1", "issue"), "TEST/1/issue");
    }
}
