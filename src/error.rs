//! Error types and handling infrastructure for logscope.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! the library error type. The binary layers `anyhow` context on top.
//!
//! ## Design Principles
//!
//! - **Non-fatal**: Every failure is returned to the caller, the core never aborts
//! - **Context preservation**: File errors carry the path, pattern errors the pattern
//! - **Consistency**: Standardized Result type across all modules

use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for logscope operations.
///
/// File errors are reported by [`LineIndexedFile::open`](crate::LineIndexedFile::open),
/// pattern errors by [`PatternFilter::set_pattern`](crate::PatternFilter::set_pattern).
#[derive(Error, Debug)]
pub enum LogscopeError {
    /// The file does not exist, is not a regular file, or cannot be opened for reading
    #[error("Failed to open file: {path}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Querying the file size failed
    #[error("Failed to get file size: {path}")]
    StatFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Memory mapping (or the buffered fallback read) failed
    #[error("Failed to map file {path}: {message}")]
    MapFailed {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The filter pattern did not compile
    #[error("{message}")]
    CompileFailed { pattern: String, message: String },

    /// A background filter ended without delivering a result
    #[error("Filter task failed: {message}")]
    FilterTaskFailed { message: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

/// Standard Result type for logscope operations.
pub type Result<T> = std::result::Result<T, LogscopeError>;

impl LogscopeError {
    /// Create an OpenFailed error for `path`
    pub fn open_failed(path: &Path, source: std::io::Error) -> Self {
        Self::OpenFailed {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a StatFailed error for `path`
    pub fn stat_failed(path: &Path, source: std::io::Error) -> Self {
        Self::StatFailed {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a MapFailed error with a descriptive message
    pub fn map_failed(
        path: &Path,
        message: impl Into<String>,
        source: Option<std::io::Error>,
    ) -> Self {
        Self::MapFailed {
            path: path.to_path_buf(),
            message: message.into(),
            source,
        }
    }

    /// Create a CompileFailed error; the message is shown to the user as-is
    pub fn compile_failed(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CompileFailed {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a FilterTaskFailed error with a descriptive message
    pub fn filter_task(message: impl Into<String>) -> Self {
        Self::FilterTaskFailed {
            message: message.into(),
        }
    }

    /// Create a ConfigError with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// True for the file-level failures reported by `open`
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            Self::OpenFailed { .. } | Self::StatFailed { .. } | Self::MapFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_display_messages() {
        let path = PathBuf::from("/test/file.log");

        let open_failed = LogscopeError::open_failed(
            &path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(open_failed.to_string(), "Failed to open file: /test/file.log");

        let map_failed = LogscopeError::map_failed(&path, "mmap returned ENOMEM", None);
        assert_eq!(
            map_failed.to_string(),
            "Failed to map file /test/file.log: mmap returned ENOMEM"
        );

        let compile_failed =
            LogscopeError::compile_failed("[", "Regex error: unclosed character class");
        assert_eq!(
            compile_failed.to_string(),
            "Regex error: unclosed character class"
        );
    }

    #[test]
    fn test_error_classification() {
        let path = PathBuf::from("/test/file.log");
        let stat = LogscopeError::stat_failed(&path, std::io::Error::other("stat"));
        assert!(stat.is_file_error());

        let task = LogscopeError::filter_task("worker dropped");
        assert!(!task.is_file_error());
        assert!(matches!(task, LogscopeError::FilterTaskFailed { .. }));

        let config = LogscopeError::config("bad toml");
        assert!(matches!(config, LogscopeError::ConfigError { .. }));
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let path = PathBuf::from("/var/log/app.log");
        let err = LogscopeError::open_failed(
            &path,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("denied"));

        let no_source = LogscopeError::map_failed(&path, "too large", None);
        assert!(no_source.source().is_none());
    }
}
