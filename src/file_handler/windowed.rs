//! Line-aligned mapping windows for files too large to address at once
//!
//! The file is split into windows that each start and end on a line boundary,
//! so every line lives entirely inside one window. Indexing maps each window
//! briefly and unmaps it again; afterwards a window is mapped on first access
//! and stays mapped, which keeps line views valid for as long as the source
//! is borrowed.

use crate::error::{LogscopeError, Result};
use crate::file_handler::line_index::LineIndex;
use log::{debug, warn};
use memchr::memrchr;
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Target span of one window
pub const DEFAULT_WINDOW_SIZE: usize = 64 * 1024 * 1024;

#[derive(Debug)]
struct Window {
    /// File offset of the window's first byte
    offset: u64,
    len: usize,

    /// Index of the window's first line within the whole file
    first_line: usize,

    /// Line starts relative to `offset`
    index: LineIndex,

    /// Mapped on first access; `None` records a failed mapping
    mapping: OnceLock<Option<Mmap>>,
}

/// A file served through lazily mapped, line-aligned windows
#[derive(Debug)]
pub struct WindowedSource {
    file: File,
    path: PathBuf,
    file_size: u64,
    windows: Vec<Window>,
    line_count: usize,
}

impl WindowedSource {
    /// Split `file` into windows of about `window_size` bytes and index every line
    ///
    /// A line longer than `window_size` widens its window until the line ends.
    ///
    /// # Errors
    /// * `MapFailed` if a window cannot be mapped during indexing
    pub fn build(
        path: &Path,
        file: File,
        file_size: u64,
        window_size: usize,
        estimated_line_length: usize,
    ) -> Result<Self> {
        let window_size = window_size.max(1);
        let mut windows = Vec::new();
        let mut line_count = 0;
        let mut offset = 0;

        while offset < file_size {
            let remaining = file_size - offset;
            let mut span = clamp_span(window_size, remaining);

            let (len, index) = loop {
                let mapping = map_range(&file, path, offset, span)?;
                let reaches_end = offset + span as u64 == file_size;
                let end = if reaches_end {
                    Some(span)
                } else {
                    memrchr(b'\n', &mapping).map(|newline| newline + 1)
                };

                match end {
                    Some(len) => {
                        break (len, LineIndex::build(&mapping[..len], estimated_line_length));
                    }
                    None => span = widen_span(path, span, remaining)?,
                }
            };

            let window_lines = index.line_count();
            windows.push(Window {
                offset,
                len,
                first_line: line_count,
                index,
                mapping: OnceLock::new(),
            });
            line_count += window_lines;
            offset += len as u64;
        }

        debug!(
            "Indexed {} in {} windows ({} lines)",
            path.display(),
            windows.len(),
            line_count
        );

        Ok(Self {
            file,
            path: path.to_path_buf(),
            file_size,
            windows,
            line_count,
        })
    }

    /// Number of lines across all windows
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Bytes of line `line` without its terminator
    ///
    /// Empty when `line` is out of range or its window cannot be mapped.
    pub fn line(&self, line: usize) -> &[u8] {
        let Some((window, local)) = self.locate(line) else {
            return &[];
        };
        let Some(data) = self.window_bytes(window) else {
            return &[];
        };
        window
            .index
            .line_range(data, local)
            .and_then(|range| data.get(range))
            .unwrap_or_default()
    }

    /// Byte span of line `line` within the file
    ///
    /// `None` when out of range or when the span is not addressable.
    pub fn line_range(&self, line: usize) -> Option<Range<usize>> {
        let (window, local) = self.locate(line)?;
        let data = self.window_bytes(window)?;
        let range = window.index.line_range(data, local)?;
        let base = usize::try_from(window.offset).ok()?;
        Some(base.checked_add(range.start)?..base.checked_add(range.end)?)
    }

    /// Size of the underlying file in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Number of windows the file was split into
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Number of windows currently mapped
    pub fn mapped_windows(&self) -> usize {
        self.windows
            .iter()
            .filter(|window| matches!(window.mapping.get(), Some(Some(_))))
            .count()
    }

    fn locate(&self, line: usize) -> Option<(&Window, usize)> {
        if line >= self.line_count {
            return None;
        }
        let slot = self
            .windows
            .partition_point(|window| window.first_line <= line)
            .checked_sub(1)?;
        let window = self.windows.get(slot)?;
        Some((window, line - window.first_line))
    }

    fn window_bytes<'a>(&'a self, window: &'a Window) -> Option<&'a [u8]> {
        window
            .mapping
            .get_or_init(|| match map_range(&self.file, &self.path, window.offset, window.len) {
                Ok(mapping) => Some(mapping),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            })
            .as_deref()
    }
}

fn map_range(file: &File, path: &Path, offset: u64, len: usize) -> Result<Mmap> {
    // SAFETY: read-only private mapping, as for a whole-file mapping
    unsafe { MmapOptions::new().offset(offset).len(len).map(file) }.map_err(|e| {
        LogscopeError::map_failed(
            path,
            format!("mapping {} bytes at offset {} failed", len, offset),
            Some(e),
        )
    })
}

fn clamp_span(window_size: usize, remaining: u64) -> usize {
    usize::try_from(remaining).map_or(window_size, |remaining| remaining.min(window_size))
}

fn widen_span(path: &Path, span: usize, remaining: u64) -> Result<usize> {
    let wider = span.checked_mul(2).ok_or_else(|| {
        LogscopeError::map_failed(path, "line too long to map in one window", None)
    })?;
    Ok(clamp_span(wider, remaining))
}
