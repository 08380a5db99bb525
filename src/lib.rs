//! # logscope - Indexed Log File Filtering
//!
//! The data core of a log viewer: open a large text file once, index its line
//! boundaries, and serve any line as a zero-copy view while a regex filter
//! selects the lines worth showing.
//!
//! ## Features
//!
//! - **Memory-Mapped Access**: Files are mapped read-only; lines are borrowed
//!   straight from the mapping, with buffered and windowed fallbacks for files
//!   that cannot be mapped in one piece
//! - **Eager Line Index**: One SIMD newline scan at open time, O(1) line lookup after
//! - **Regex Filtering**: ripgrep's regex engine, evaluated on the caller's thread
//!   or on a background thread with a stale-result guard
//! - **Byte-Oriented**: No UTF-8 requirement on file content
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`file_handler`] - File loading, line indexing and line views
//! - [`filter`] - Pattern compilation, filtering and the visible-line view
//! - [`config`] - Reader and filter settings

// Core modules
pub mod config;
pub mod error;
pub mod file_handler;
pub mod filter;

// Re-export commonly used types for convenience
pub use config::{Config, ReaderConfig};
pub use error::{LogscopeError, Result};
pub use file_handler::{AccessStrategy, LineIndexedFile, LineSource, SourceKind};
pub use filter::{FilterOptions, FilterView, MatchResult, PatternFilter, PendingMatches};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
