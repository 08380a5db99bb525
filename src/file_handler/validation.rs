//! File validation utilities for ensuring files are suitable for indexing.
//!
//! These checks run on an already opened handle, so the answer describes the
//! file that will actually be read rather than whatever the path pointed to
//! a moment earlier.

use crate::error::{LogscopeError, Result};
use std::fs::Metadata;
use std::path::Path;

/// Reject anything that is not a regular file (directories, sockets, devices)
///
/// Empty files are accepted: they open successfully with zero lines.
pub fn validate_regular_file(path: &Path, metadata: &Metadata) -> Result<()> {
    if metadata.is_file() {
        return Ok(());
    }

    let kind = if metadata.is_dir() {
        "Path is a directory"
    } else {
        "Path is not a regular file"
    };
    Err(LogscopeError::open_failed(
        path,
        std::io::Error::new(std::io::ErrorKind::InvalidInput, kind),
    ))
}

/// Convert a file length to an in-memory length
///
/// A file larger than the address space can be neither mapped nor buffered.
pub fn addressable_len(path: &Path, file_size: u64) -> Result<usize> {
    usize::try_from(file_size).map_err(|_| {
        LogscopeError::map_failed(
            path,
            format!("file of {} bytes exceeds the addressable range", file_size),
            None,
        )
    })
}
