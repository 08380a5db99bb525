//! SIMD-optimized line boundary index
//!
//! This module provides the LineIndex structure that records where every line of a
//! file starts. The index is built once, eagerly, by a single forward scan using
//! memchr for SIMD-optimized newline detection.

use memchr::memchr_iter;
use std::ops::Range;

/// Average line length assumed when pre-sizing the offset vector
pub const DEFAULT_ESTIMATED_LINE_LENGTH: usize = 80;

/// Upper bound on the number of offsets reserved up front
///
/// The estimate is only an allocation hint; a bad estimate on a huge file
/// must not reserve gigabytes before the scan has seen a single newline.
const MAX_RESERVED_LINES: usize = 1 << 22;

/// Ordered byte offsets of line starts
///
/// - `line_offsets[0] = 0` for any non-empty file
/// - `line_offsets[n]` = byte position after the nth newline
/// - A newline at the very last byte does not start a new line
/// - Empty for an empty file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    line_offsets: Vec<usize>,
}

impl LineIndex {
    /// Create an empty index (zero lines)
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `data` once and record every line start
    ///
    /// # Arguments
    /// * `data` - The file content (mapped or buffered)
    /// * `estimated_line_length` - Average line length used to pre-size the index
    ///
    /// # Performance
    /// * O(n) in the number of bytes, a single memchr pass
    pub fn build(data: &[u8], estimated_line_length: usize) -> Self {
        if data.is_empty() {
            return Self::new();
        }

        let reserve = (data.len() / estimated_line_length.max(1)).min(MAX_RESERVED_LINES) + 1;
        let mut line_offsets = Vec::with_capacity(reserve);
        line_offsets.push(0);

        let len = data.len();
        for newline in memchr_iter(b'\n', data) {
            let next = newline + 1;
            if next < len {
                line_offsets.push(next);
            }
        }

        Self { line_offsets }
    }

    /// Number of indexed lines
    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }

    /// True when the index holds no lines
    pub fn is_empty(&self) -> bool {
        self.line_offsets.is_empty()
    }

    /// Byte offset where `line` starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_offsets.get(line).copied()
    }

    /// Byte span of `line` within `data`, excluding its terminator
    ///
    /// `data` must be the buffer this index was built from. The end is the next
    /// line's start minus the newline, or the data length for the last line; a
    /// newline still sitting just before the end is trimmed once more.
    pub fn line_range(&self, data: &[u8], line: usize) -> Option<Range<usize>> {
        let start = *self.line_offsets.get(line)?;
        let mut end = match self.line_offsets.get(line + 1) {
            Some(next) => next - 1,
            None => data.len(),
        };

        if end > start && data.get(end - 1) == Some(&b'\n') {
            end -= 1;
        }

        Some(start..end)
    }

    /// All recorded line starts
    pub fn offsets(&self) -> &[usize] {
        &self.line_offsets
    }

    /// Drop every recorded offset and release the allocation
    pub fn clear(&mut self) {
        self.line_offsets = Vec::new();
    }
}
