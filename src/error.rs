// src/error.rs

//! Error types for rpmcat

use rusqlite::ErrorCode;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the catalogue engine
#[derive(Error, Debug)]
pub enum Error {
    /// Store error from SQLite
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database could not be initialized or opened
    #[error("Initialization error: {0}")]
    InitError(String),

    /// A package file could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A path given by the user is not usable
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A file offered for import is not a binary RPM
    #[error("{0} is not a binary rpm")]
    NotAnArtifact(String),

    /// A tag filter named a tag that does not exist
    #[error("Tag {0} is not a known tag")]
    UnknownTag(String),

    /// Record already exists (tags are created exactly once)
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Query pattern could not be compiled
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Executable could not be structurally parsed
    #[error("Failed to parse binary: {0}")]
    BinaryParse(String),
}

impl Error {
    /// Whether this error means the store itself is gone and the run must stop
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Database(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::CannotOpen
                    | ErrorCode::DatabaseCorrupt
                    | ErrorCode::NotADatabase
                    | ErrorCode::DiskFull
                    | ErrorCode::ReadOnly
                    | ErrorCode::SystemIoFailure
                    | ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
            ),
            Error::InitError(_) => true,
            _ => false,
        }
    }

    /// Whether this error is caused by user input rather than the system
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidPath(_)
                | Error::NotAnArtifact(_)
                | Error::UnknownTag(_)
                | Error::AlreadyExists(_)
                | Error::InvalidPattern { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
            None,
        );
        assert!(Error::Database(busy).is_fatal());

        let constraint = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            None,
        );
        assert!(!Error::Database(constraint).is_fatal());
        assert!(!Error::UnknownTag("f40".to_string()).is_fatal());
    }

    #[test]
    fn test_user_errors() {
        assert!(Error::UnknownTag("f40".to_string()).is_user_error());
        assert!(Error::NotAnArtifact("foo.src.rpm".to_string()).is_user_error());
        assert!(!Error::ParseError("bad header".to_string()).is_user_error());
    }
}
