//! Match results and the per-line evaluation loop.

use crate::file_handler::LineSource;
use grep_matcher::Matcher;

/// Indices of the lines that satisfied a pattern
///
/// Indices are zero-based, strictly increasing, and follow input order. When no
/// valid pattern is set the result is the identity sequence `[0, n)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    indices: Vec<usize>,
    skipped: usize,
}

impl MatchResult {
    /// Every line visible: `[0, 1, ..., line_count - 1]`
    pub fn identity(line_count: usize) -> Self {
        Self {
            indices: (0..line_count).collect(),
            skipped: 0,
        }
    }

    /// Matching line indices in input order
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Consume the result, keeping only the indices
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    /// Number of matching lines
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when no line matched
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Lines excluded because the matcher reported an error on them
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl From<MatchResult> for Vec<usize> {
    fn from(result: MatchResult) -> Self {
        result.indices
    }
}

/// Evaluate every line of `lines` against `matcher`
///
/// A line on which the matcher fails is excluded and counted in
/// [`MatchResult::skipped`]; the pass always runs to the end.
pub fn select_matching<M, S>(matcher: &M, lines: &S) -> MatchResult
where
    M: Matcher,
    S: LineSource + ?Sized,
{
    let line_count = lines.line_count();
    // Assume roughly one line in ten matches
    let mut indices = Vec::with_capacity(line_count / 10);
    let mut skipped = 0;

    for index in 0..line_count {
        match matcher.is_match(lines.line(index)) {
            Ok(true) => indices.push(index),
            Ok(false) => {}
            Err(_) => skipped += 1,
        }
    }

    MatchResult { indices, skipped }
}
