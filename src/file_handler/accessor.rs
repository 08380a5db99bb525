//! Core line access abstraction.
//!
//! This module defines the LineSource trait: the "line count plus line by index"
//! view that the filter consumes. It is implemented by
//! [`LineIndexedFile`](crate::LineIndexedFile) and by ordinary in-memory line
//! sequences, so the filter never depends on how lines are stored.

use std::sync::Arc;

/// Random-access sequence of lines
///
/// Lines are exposed as raw bytes without their terminator. All implementations
/// must be thread-safe so a sequence can be handed to a background filter.
pub trait LineSource: Send + Sync {
    /// Number of lines in the sequence
    fn line_count(&self) -> usize;

    /// Bytes of line `index`
    ///
    /// Returns an empty slice when `index` is out of range; callers are
    /// expected to range-check against `line_count` but must not crash otherwise.
    fn line(&self, index: usize) -> &[u8];
}

impl<T> LineSource for [T]
where
    T: AsRef<[u8]> + Send + Sync,
{
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line(&self, index: usize) -> &[u8] {
        self.get(index)
            .map(AsRef::<[u8]>::as_ref)
            .unwrap_or_default()
    }
}

impl<T> LineSource for Vec<T>
where
    T: AsRef<[u8]> + Send + Sync,
{
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line(&self, index: usize) -> &[u8] {
        self.as_slice().line(index)
    }
}

impl<S> LineSource for Arc<S>
where
    S: LineSource + ?Sized,
{
    fn line_count(&self) -> usize {
        self.as_ref().line_count()
    }

    fn line(&self, index: usize) -> &[u8] {
        self.as_ref().line(index)
    }
}

impl<S> LineSource for &S
where
    S: LineSource + ?Sized,
{
    fn line_count(&self) -> usize {
        (**self).line_count()
    }

    fn line(&self, index: usize) -> &[u8] {
        (**self).line(index)
    }
}
