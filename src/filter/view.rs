//! Visible-line bookkeeping for a filtered file.
//!
//! FilterView is the glue a presentation layer needs between a
//! [`LineIndexedFile`] and a [`PatternFilter`]: it owns the list of visible line
//! indices and a status message, and only installs background results that are
//! still current.

use crate::error::Result;
use crate::file_handler::LineIndexedFile;
use crate::filter::engine::PatternFilter;
use crate::filter::matches::MatchResult;
use crate::filter::task::PendingMatches;
use bstr::{BStr, ByteSlice};
use log::debug;
use std::sync::Arc;

const STATUS_ALL_LINES: &str = "Showing all lines";
const STATUS_FILTERING: &str = "Filtering...";

/// The subset of a file's lines that passes the current filter
#[derive(Debug)]
pub struct FilterView {
    file: Arc<LineIndexedFile>,
    filter: PatternFilter,

    /// Indices into `file` of the lines currently shown
    visible: Vec<usize>,

    /// Generation of the background pass whose result is awaited
    in_flight: Option<u64>,

    status: String,
}

impl FilterView {
    /// Create a view showing every line of `file`
    pub fn new(file: Arc<LineIndexedFile>, filter: PatternFilter) -> Self {
        let visible = (0..file.line_count()).collect();
        Self {
            file,
            filter,
            visible,
            in_flight: None,
            status: STATUS_ALL_LINES.to_string(),
        }
    }

    /// Filter synchronously and install the result
    ///
    /// An empty pattern shows every line.
    ///
    /// # Errors
    /// * `CompileFailed` - the visible set is left unchanged and the status
    ///   reports the error
    pub fn apply(&mut self, pattern: &str) -> Result<()> {
        if pattern.is_empty() {
            self.show_all();
            return Ok(());
        }

        self.set_pattern(pattern)?;
        let result = self.filter.filter(self.file.as_ref());
        self.install(result);
        Ok(())
    }

    /// Set the pattern and start a background pass over the whole file
    ///
    /// The caller resolves the returned handle and passes its result to
    /// [`accept`](Self::accept) together with the handle's generation. An empty
    /// pattern shows every line immediately; its pass yields the identity result.
    ///
    /// # Errors
    /// * `CompileFailed` - no pass is started and the status reports the error
    pub fn submit(&mut self, pattern: &str) -> Result<PendingMatches> {
        if pattern.is_empty() {
            self.show_all();
        } else {
            self.set_pattern(pattern)?;
            self.status = STATUS_FILTERING.to_string();
        }

        let pending = self.filter.filter_async(Arc::clone(&self.file));
        self.in_flight = Some(pending.generation());
        Ok(pending)
    }

    /// Install a background result if no newer request superseded it
    ///
    /// Returns false (and leaves the view untouched) for a stale result.
    pub fn accept(&mut self, generation: u64, result: MatchResult) -> bool {
        if !self.filter.is_current(generation) {
            debug!(
                "Discarding stale filter result (generation {}, current {})",
                generation,
                self.filter.generation()
            );
            return false;
        }
        self.install(result);
        true
    }

    /// Submit a background pass, await it, and install it if still current
    pub async fn apply_async(&mut self, pattern: &str) -> Result<bool> {
        let pending = self.submit(pattern)?;
        let generation = pending.generation();
        let result = pending.await?;
        Ok(self.accept(generation, result))
    }

    /// Number of visible lines
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Text of the `index`th visible line; empty when out of range
    pub fn visible_line(&self, index: usize) -> &BStr {
        match self.visible.get(index) {
            Some(&line) => self.file.get_line(line),
            None => b"".as_bstr(),
        }
    }

    /// File line indices of the visible lines
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    /// Human-readable state of the last filter operation
    pub fn status(&self) -> &str {
        &self.status
    }

    /// True while a submitted background pass has not been accepted
    pub fn is_filtering(&self) -> bool {
        self.in_flight
            .is_some_and(|generation| self.filter.is_current(generation))
    }

    /// The underlying file
    pub fn file(&self) -> &LineIndexedFile {
        &self.file
    }

    /// The filter driving this view
    pub fn filter(&self) -> &PatternFilter {
        &self.filter
    }

    fn set_pattern(&mut self, pattern: &str) -> Result<()> {
        if let Err(e) = self.filter.set_pattern(pattern) {
            self.in_flight = None;
            self.status = format!("Invalid regex: {}", self.filter.error());
            return Err(e);
        }
        Ok(())
    }

    fn show_all(&mut self) {
        self.filter.clear_pattern();
        self.install(MatchResult::identity(self.file.line_count()));
    }

    fn install(&mut self, result: MatchResult) {
        self.status = if self.filter.has_valid_pattern() {
            format!("Found {} matching lines", result.len())
        } else {
            STATUS_ALL_LINES.to_string()
        };
        self.visible = result.into_indices();
        self.in_flight = None;
    }
}
