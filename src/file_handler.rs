//! File handling with memory mapping and eager line indexing.
//!
//! This module provides the core file access functionality for logscope: a
//! read-only byte source (memory-mapped, or buffered when mapping is not
//! feasible), a line boundary index over it, and zero-copy line views. Files
//! that fit neither way are served through line-aligned mapping windows.

pub mod accessor;
pub mod indexed_file;
pub mod line_index;
pub mod source;
pub mod validation;
pub mod windowed;

pub use accessor::LineSource;
pub use indexed_file::LineIndexedFile;
pub use line_index::LineIndex;
pub use source::ByteSource;
pub use windowed::WindowedSource;

/// Access strategy for loading file bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum AccessStrategy {
    /// Map the whole file, falling back to a buffered read and then to
    /// mapping windows when the file cannot be held in one piece
    #[default]
    Auto,
    /// Always memory-map; mapping failures are reported
    MemoryMapped,
    /// Always read the whole file into an owned buffer
    Buffered,
    /// Always serve the file through line-aligned mapping windows
    Windowed,
}

/// Which kind of byte source backs an open file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Bytes are served from a read-only memory mapping
    Mapped,
    /// Bytes were read once into an owned buffer
    Buffered,
    /// Bytes are served from mapping windows over parts of the file
    Windowed,
}
