//! Error types
//!
//! Defines the error vocabulary of the adapter (`FsError`) and of the
//! store contract it delegates to (`StoreError`).

use std::fmt;
use std::io;

/// Errors reported by a `FileStorage` implementation.
#[derive(Debug)]
pub enum StoreError {
    NotFound(String),
    AlreadyExists(String),
    NotADirectory(String),
    IsADirectory(String),
    NotEmpty(String),
    UnknownUser(String),
    UnknownGroup(String),
    UnknownType(u32),
    Io(io::Error),
    Remote(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(p) => write!(f, "No such file or directory: {}", p),
            StoreError::AlreadyExists(p) => write!(f, "File exists: {}", p),
            StoreError::NotADirectory(p) => write!(f, "Not a directory: {}", p),
            StoreError::IsADirectory(p) => write!(f, "Is a directory: {}", p),
            StoreError::NotEmpty(p) => write!(f, "Directory not empty: {}", p),
            StoreError::UnknownUser(u) => write!(f, "Unknown user: {}", u),
            StoreError::UnknownGroup(g) => write!(f, "Unknown group: {}", g),
            StoreError::UnknownType(code) => write!(f, "Unknown file type code: {:#o}", code),
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Remote(msg) => write!(f, "Remote store error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(error: io::Error) -> Self {
        StoreError::Io(error)
    }
}

/// Errors surfaced by `CfsFileSystem` and its translation helpers.
#[derive(Debug)]
pub enum FsError {
    /// A required key is missing from the site configuration.
    ConfigIncomplete { source: String, key: &'static str },
    /// The site configuration could not be read or parsed.
    Config(String),
    /// A required environment value is missing.
    Environment(String),
    UnsupportedScheme(String),
    InvalidPath(String),
    /// A permission string that is not octal notation.
    InvalidPermission(String),
    NotFound(String),
    AlreadyExists(String),
    IsADirectory(String),
    UnsupportedFlags(String),
    MkdirFailed(String),
    RenameFailed { src: String, dst: String },
    Unsupported { operation: &'static str, path: String },
    StoreFailure(StoreError),
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::ConfigIncomplete { source, key } => {
                write!(f, "Incomplete config {}: missing {}", source, key)
            }
            FsError::Config(msg) => write!(f, "Config error: {}", msg),
            FsError::Environment(msg) => write!(f, "Environment error: {}", msg),
            FsError::UnsupportedScheme(p) => {
                write!(f, "Unsupported scheme in {}, expected cfs://", p)
            }
            FsError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            FsError::InvalidPermission(s) => write!(f, "Invalid permission: {}", s),
            FsError::NotFound(p) => write!(f, "File not found: {}", p),
            FsError::AlreadyExists(p) => write!(f, "File already exists: {}", p),
            FsError::IsADirectory(p) => write!(f, "Path is a directory: {}", p),
            FsError::UnsupportedFlags(flags) => write!(f, "Unsupported create flags: {}", flags),
            FsError::MkdirFailed(p) => write!(f, "Failed to mkdirs: {}", p),
            FsError::RenameFailed { src, dst } => write!(f, "Failed to rename: {} to: {}", src, dst),
            FsError::Unsupported { operation, path } => {
                write!(f, "Unsupported operation {}: {}", operation, path)
            }
            FsError::StoreFailure(e) => write!(f, "Store failure: {}", e),
        }
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FsError::StoreFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for FsError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(p) => FsError::NotFound(p),
            other => FsError::StoreFailure(other),
        }
    }
}

impl From<FsError> for io::Error {
    fn from(error: FsError) -> Self {
        let kind = match &error {
            FsError::NotFound(_) => io::ErrorKind::NotFound,
            FsError::AlreadyExists(_) => io::ErrorKind::AlreadyExists,
            FsError::InvalidPath(_)
            | FsError::InvalidPermission(_)
            | FsError::UnsupportedFlags(_) => io::ErrorKind::InvalidInput,
            FsError::Unsupported { .. } => io::ErrorKind::Unsupported,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, error)
    }
}

impl From<StoreError> for io::Error {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Io(e) => e,
            other => FsError::from(other).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err = FsError::from(StoreError::NotFound("/a".into()));
        assert!(matches!(err, FsError::NotFound(p) if p == "/a"));
    }

    #[test]
    fn test_other_store_errors_are_wrapped() {
        let err = FsError::from(StoreError::NotEmpty("/d".into()));
        assert!(matches!(err, FsError::StoreFailure(StoreError::NotEmpty(_))));
    }

    #[test]
    fn test_unsupported_names_operation_and_path() {
        let err = FsError::Unsupported {
            operation: "getXAttr",
            path: "/x".into(),
        };
        assert_eq!(err.to_string(), "Unsupported operation getXAttr: /x");
    }

    #[test]
    fn test_io_error_kind() {
        let err: io::Error = FsError::AlreadyExists("/f".into()).into();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        let err: io::Error = FsError::InvalidPermission("rwx".into()).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_invalid_permission_message() {
        let err = FsError::InvalidPermission("rwx".into());
        assert_eq!(err.to_string(), "Invalid permission: rwx");
    }
}
