use std::io;

/// Boxed failure from a data source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Filesystem errors. Each variant names the operation and the path it was
/// invoked on.
#[derive(thiserror::Error, Debug)]
pub enum FsError {
    /// Malformed path. Detected before any remote access.
    #[error("{op} {path}: invalid path")]
    InvalidPath { op: &'static str, path: String },
    /// A path segment has no corresponding remote resource.
    #[error("{op} {path}: no such file or directory")]
    NotFound { op: &'static str, path: String },
    /// Directory operation on a file.
    #[error("{op} {path}: not a directory")]
    NotADirectory { op: &'static str, path: String },
    /// The data source call failed.
    #[error("{op} {path}: {source}")]
    Remote {
        op: &'static str,
        path: String,
        source: BoxError,
    },
}

impl FsError {
    pub(crate) fn remote<E>(op: &'static str, path: &str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FsError::Remote {
            op,
            path: path.to_string(),
            source: Box::new(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }

    pub fn is_invalid_path(&self) -> bool {
        matches!(self, FsError::InvalidPath { .. })
    }

    pub fn op(&self) -> &'static str {
        match self {
            FsError::InvalidPath { op, .. }
            | FsError::NotFound { op, .. }
            | FsError::NotADirectory { op, .. }
            | FsError::Remote { op, .. } => op,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            FsError::InvalidPath { path, .. }
            | FsError::NotFound { path, .. }
            | FsError::NotADirectory { path, .. }
            | FsError::Remote { path, .. } => path,
        }
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        let kind = match &err {
            FsError::InvalidPath { .. } => io::ErrorKind::InvalidInput,
            FsError::NotFound { .. } => io::ErrorKind::NotFound,
            FsError::NotADirectory { .. } => io::ErrorKind::NotADirectory,
            FsError::Remote { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = FsError::NotFound {
            op: "open",
            path: "TEST/9".into(),
        };
        assert_eq!(err.to_string(), "open TEST/9: no such file or directory");
        assert_eq!(err.op(), "open");
        assert_eq!(err.path(), "TEST/9");
    }

    #[test]
    fn test_io_error_kind() {
        let err: io::Error = FsError::NotFound {
            op: "open",
            path: "x".into(),
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err: io::Error = FsError::InvalidPath {
            op: "open",
            path: "..".into(),
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_remote_keeps_source() {
        let inner = io::Error::new(io::ErrorKind::TimedOut, "deadline");
        let err = FsError::remote("stat", "TEST/1", inner);
        assert_eq!(err.to_string(), "stat TEST/1: deadline");
        assert!(std::error::Error::source(&err).is_some());
    }
}
