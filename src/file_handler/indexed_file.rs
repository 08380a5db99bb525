//! Line-indexed, read-only view of a log file
//!
//! This module provides LineIndexedFile: it loads a file through a [`ByteSource`],
//! indexes every line start up front, and hands out zero-copy line views that
//! borrow directly from the mapped (or buffered) bytes. A file that can be held
//! neither way is served through a [`WindowedSource`] instead.

use crate::config::ReaderConfig;
use crate::error::{LogscopeError, Result};
use crate::file_handler::accessor::LineSource;
use crate::file_handler::line_index::LineIndex;
use crate::file_handler::source::ByteSource;
use crate::file_handler::validation::validate_regular_file;
use crate::file_handler::windowed::WindowedSource;
use crate::file_handler::{AccessStrategy, SourceKind};
use bstr::{BStr, ByteSlice};
use log::{debug, warn};
use std::fs::File;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where the lines of an open, non-empty file are read from
#[derive(Debug)]
enum Content {
    /// The whole file in one mapping or buffer, with its line starts
    Contiguous { source: ByteSource, index: LineIndex },
    Windowed(WindowedSource),
}

impl Content {
    fn line_count(&self) -> usize {
        match self {
            Content::Contiguous { index, .. } => index.line_count(),
            Content::Windowed(windowed) => windowed.line_count(),
        }
    }

    fn line(&self, line: usize) -> &[u8] {
        match self {
            Content::Contiguous { source, index } => {
                let data = source.as_bytes();
                match index.line_range(data, line) {
                    Some(range) => &data[range],
                    None => &[],
                }
            }
            Content::Windowed(windowed) => windowed.line(line),
        }
    }

    fn line_range(&self, line: usize) -> Option<Range<usize>> {
        match self {
            Content::Contiguous { source, index } => index.line_range(source.as_bytes(), line),
            Content::Windowed(windowed) => windowed.line_range(line),
        }
    }

    fn size(&self) -> u64 {
        match self {
            Content::Contiguous { source, .. } => source.len() as u64,
            Content::Windowed(windowed) => windowed.file_size(),
        }
    }

    fn kind(&self) -> SourceKind {
        match self {
            Content::Contiguous { source, .. } => source.kind(),
            Content::Windowed(_) => SourceKind::Windowed,
        }
    }
}

/// A file opened for random-access, zero-copy line retrieval
///
/// Line views returned by [`get_line`](Self::get_line) and
/// [`get_lines`](Self::get_lines) borrow from `self`, so the borrow checker rules
/// out reading a view after [`close`](Self::close) or a new [`open`](Self::open).
///
/// Once opened the instance is never mutated by reads and can be shared across
/// threads (for example behind an `Arc`) for concurrent readers.
#[derive(Debug, Default)]
pub struct LineIndexedFile {
    config: ReaderConfig,

    /// Path of the open file (empty when closed)
    filename: PathBuf,

    /// File size in bytes
    file_size: u64,

    /// Indexed file content; `None` when closed or for an empty file
    content: Option<Content>,

    /// True after a successful open, including of an empty file
    open: bool,
}

impl LineIndexedFile {
    /// Create a closed instance with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a closed instance with a custom configuration
    pub fn with_config(config: ReaderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create an instance and open `path` with the default configuration
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = Self::new();
        file.open(path)?;
        Ok(file)
    }

    /// Open a file and index its lines
    ///
    /// Any previously open file is closed first. A failed open leaves the instance
    /// closed; everything acquired during the call is released before returning.
    ///
    /// # Errors
    /// * `OpenFailed` - the file does not exist, cannot be read, or is not a regular file
    /// * `StatFailed` - the file size cannot be queried
    /// * `MapFailed` - the content cannot be mapped, read, or split into windows
    ///
    /// # Performance
    /// * O(n) - one memchr scan over the file to build the line index
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.close();

        let path = path.as_ref();
        let started = Instant::now();

        let file = File::open(path).map_err(|e| LogscopeError::open_failed(path, e))?;
        let metadata = file
            .metadata()
            .map_err(|e| LogscopeError::stat_failed(path, e))?;
        validate_regular_file(path, &metadata)?;

        // Empty files are valid but never mapped
        let content = if metadata.len() == 0 {
            None
        } else {
            Some(self.load_content(path, file, metadata.len())?)
        };

        self.file_size = content.as_ref().map_or(0, Content::size);
        self.filename = path.to_path_buf();
        self.content = content;
        self.open = true;

        debug!(
            "Opened {} ({} bytes, {} lines, {:?}) in {:?}",
            path.display(),
            self.file_size,
            self.line_count(),
            self.source_kind(),
            started.elapsed()
        );

        Ok(())
    }

    /// Release the file content and clear all derived state
    ///
    /// Safe to call any number of times, including on a never-opened instance.
    pub fn close(&mut self) {
        if self.open {
            debug!("Closing {}", self.filename.display());
        }
        self.content = None;
        self.filename = PathBuf::new();
        self.file_size = 0;
        self.open = false;
    }

    /// Number of lines in the file
    pub fn line_count(&self) -> usize {
        self.content.as_ref().map_or(0, Content::line_count)
    }

    /// Get line `index` without its terminator (zero-copy)
    ///
    /// Returns an empty view when `index` is out of range or nothing is open.
    pub fn get_line(&self, index: usize) -> &BStr {
        self.line_bytes(index).as_bstr()
    }

    /// Get up to `count` lines starting at `start`
    ///
    /// Stops early at the end of the file; an out-of-range `start` yields an
    /// empty vector.
    pub fn get_lines(&self, start: usize, count: usize) -> Vec<&BStr> {
        let end = start.saturating_add(count).min(self.line_count());
        if start >= end {
            return Vec::new();
        }
        (start..end).map(|index| self.get_line(index)).collect()
    }

    /// Iterate over every line in order
    pub fn lines(&self) -> impl Iterator<Item = &BStr> + '_ {
        (0..self.line_count()).map(move |index| self.get_line(index))
    }

    /// Byte span of line `index` within the file, excluding its terminator
    pub fn line_range(&self, index: usize) -> Option<Range<usize>> {
        self.content.as_ref()?.line_range(index)
    }

    /// Size of the open file in bytes (0 when closed)
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Path of the open file (empty when closed)
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// True after a successful open and before close
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the content is mapped, buffered or windowed; `None` when nothing is held
    pub fn source_kind(&self) -> Option<SourceKind> {
        self.content.as_ref().map(Content::kind)
    }

    /// Configuration used by `open`
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    fn line_bytes(&self, index: usize) -> &[u8] {
        match self.content.as_ref() {
            Some(content) => content.line(index),
            None => &[],
        }
    }

    fn load_content(&self, path: &Path, file: File, file_size: u64) -> Result<Content> {
        match self.config.strategy {
            AccessStrategy::Windowed => self.load_windowed(path, file, file_size),
            AccessStrategy::Auto => match ByteSource::load(path, &file, file_size, &self.config) {
                Ok(source) => Ok(self.index_contiguous(source)),
                Err(e) => {
                    warn!("{}; serving the file through mapping windows", e);
                    self.load_windowed(path, file, file_size).map_err(|_| e)
                }
            },
            AccessStrategy::MemoryMapped | AccessStrategy::Buffered => {
                let source = ByteSource::load(path, &file, file_size, &self.config)?;
                Ok(self.index_contiguous(source))
            }
        }
    }

    fn index_contiguous(&self, source: ByteSource) -> Content {
        let index = LineIndex::build(source.as_bytes(), self.config.estimated_line_length);
        Content::Contiguous { source, index }
    }

    fn load_windowed(&self, path: &Path, file: File, file_size: u64) -> Result<Content> {
        WindowedSource::build(
            path,
            file,
            file_size,
            self.config.window_size,
            self.config.estimated_line_length,
        )
        .map(Content::Windowed)
    }
}

impl LineSource for LineIndexedFile {
    fn line_count(&self) -> usize {
        LineIndexedFile::line_count(self)
    }

    fn line(&self, index: usize) -> &[u8] {
        self.line_bytes(index)
    }
}
