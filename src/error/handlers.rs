//! Error handlers
//!
//! Maps adapter errors to shell exit statuses and logs them.

use crate::error::types::{FsError, StoreError};
use log::error;

/// Log an adapter error
pub fn handle_error(err: &FsError) {
    error!("CFS error: {}", err);
}

/// Convert an error to a shell status code (errno-style)
pub fn error_to_exit_code(err: &FsError) -> i32 {
    match err {
        FsError::ConfigIncomplete { .. } | FsError::Config(_) | FsError::Environment(_) => 78,
        FsError::UnsupportedScheme(_) | FsError::InvalidPath(_) => 22,
        FsError::NotFound(_) => 2,
        FsError::AlreadyExists(_) => 17,
        FsError::IsADirectory(_) => 21,
        FsError::InvalidPermission(_) | FsError::UnsupportedFlags(_) => 22,
        FsError::MkdirFailed(_) | FsError::RenameFailed { .. } => 5,
        FsError::Unsupported { .. } => 95,
        FsError::StoreFailure(StoreError::NotADirectory(_)) => 20,
        FsError::StoreFailure(StoreError::NotEmpty(_)) => 39,
        FsError::StoreFailure(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(error_to_exit_code(&FsError::NotFound("/a".into())), 2);
        assert_eq!(error_to_exit_code(&FsError::InvalidPermission("rwx".into())), 22);
        let renamed = FsError::RenameFailed {
            src: "/a".into(),
            dst: "/b".into(),
        };
        assert_eq!(error_to_exit_code(&renamed), 5);
        assert_eq!(
            error_to_exit_code(&FsError::StoreFailure(StoreError::NotEmpty("/d".into()))),
            39
        );
    }
}
