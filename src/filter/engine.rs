//! Thread-safe pattern filter with synchronous and background evaluation.

use crate::error::{LogscopeError, Result};
use crate::file_handler::LineSource;
use crate::filter::matches::{select_matching, MatchResult};
use crate::filter::pattern::{CompiledPattern, FilterOptions};
use crate::filter::task::PendingMatches;
use grep_matcher::Matcher;
use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Pattern state guarded by the filter lock
#[derive(Debug, Default)]
struct FilterState {
    options: FilterOptions,
    pattern: Arc<CompiledPattern>,
}

/// Compiles a pattern and selects the lines that match it
///
/// At most one compiled pattern is active. Pattern changes and every filtering
/// pass serialize on a single lock, so a pass never observes a half-updated
/// pattern; a background pass in flight blocks a concurrent `set_pattern` until
/// it finishes, and vice versa.
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    state: Arc<Mutex<FilterState>>,

    /// Bumped by every pattern change and every background submission
    generation: Arc<AtomicU64>,
}

impl PatternFilter {
    /// Create a filter with no pattern and default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter with no pattern and the given options
    pub fn with_options(options: FilterOptions) -> Self {
        Self {
            state: Arc::new(Mutex::new(FilterState {
                options,
                pattern: Arc::default(),
            })),
            generation: Arc::default(),
        }
    }

    /// Replace the current pattern
    ///
    /// An empty `text` disables filtering and always succeeds. Otherwise the text
    /// is compiled; on failure it still becomes the current pattern (with no
    /// matcher) so a stale pattern is never silently reused.
    ///
    /// # Errors
    /// * `CompileFailed` with a human-readable message
    pub fn set_pattern(&self, text: &str) -> Result<()> {
        let mut state = self.state.lock();
        self.install_pattern(&mut state, text)
    }

    /// Remove the pattern and its error; every line becomes visible
    pub fn clear_pattern(&self) {
        let mut state = self.state.lock();
        state.pattern = Arc::default();
        self.bump_generation();
    }

    /// Change how pattern text is interpreted and recompile the current text
    ///
    /// # Errors
    /// * `CompileFailed` if the current text does not compile under `options`
    pub fn set_options(&self, options: FilterOptions) -> Result<()> {
        let mut state = self.state.lock();
        state.options = options;
        let text = state.pattern.text().to_string();
        self.install_pattern(&mut state, &text)
    }

    /// Options used for the next compilation
    pub fn options(&self) -> FilterOptions {
        self.state.lock().options.clone()
    }

    /// Select the lines of `lines` that match the current pattern
    ///
    /// Lines are evaluated in input order. A line the matcher fails on is left
    /// out. With no valid pattern the identity sequence is returned.
    pub fn filter<S>(&self, lines: &S) -> MatchResult
    where
        S: LineSource + ?Sized,
    {
        let state = self.state.lock();
        evaluate(&state.pattern, lines)
    }

    /// Run [`filter`](Self::filter) on a background thread
    ///
    /// The pattern current at the time of this call is used, even if it is
    /// replaced before the pass starts. The pass cannot be cancelled; callers
    /// discard superseded results by checking [`PendingMatches::generation`]
    /// against [`is_current`](Self::is_current).
    pub fn filter_async<S>(&self, lines: S) -> PendingMatches
    where
        S: LineSource + 'static,
    {
        let (pattern, generation) = {
            let state = self.state.lock();
            (Arc::clone(&state.pattern), self.bump_generation())
        };

        let shared = Arc::clone(&self.state);
        let text = pattern.text().to_string();
        PendingMatches::spawn(generation, text, move || {
            // Serialize with pattern changes and other passes
            let _guard = shared.lock();
            evaluate(&pattern, &lines)
        })
    }

    /// Test a single line against the current pattern
    ///
    /// Returns false when no valid pattern is set or the matcher fails.
    pub fn matches(&self, line: impl AsRef<[u8]>) -> bool {
        let state = self.state.lock();
        state
            .pattern
            .matcher()
            .is_some_and(|matcher| matcher.is_match(line.as_ref()).unwrap_or(false))
    }

    /// True iff the most recent `set_pattern` compiled successfully
    pub fn has_valid_pattern(&self) -> bool {
        self.state.lock().pattern.is_valid()
    }

    /// Text of the current pattern (also for a pattern that failed to compile)
    pub fn pattern(&self) -> String {
        self.state.lock().pattern.text().to_string()
    }

    /// Last compile error, empty when the current pattern is valid or cleared
    pub fn error(&self) -> String {
        self.state
            .lock()
            .pattern
            .error()
            .unwrap_or_default()
            .to_string()
    }

    /// Current request generation
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// True if no pattern change or background submission happened after `generation`
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Compile `text` with the current options and make it the active pattern
    ///
    /// Runs under the caller's guard so the swap and the generation bump are
    /// one step for every other clone.
    fn install_pattern(&self, state: &mut FilterState, text: &str) -> Result<()> {
        let compiled = CompiledPattern::compile(text, &state.options);
        let outcome = match compiled.error() {
            Some(message) => Err(LogscopeError::compile_failed(text, message)),
            None => Ok(()),
        };

        debug!(
            "Pattern set to {:?} (valid: {})",
            compiled.text(),
            compiled.is_valid()
        );
        state.pattern = Arc::new(compiled);
        self.bump_generation();
        outcome
    }

    fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn evaluate<S>(pattern: &CompiledPattern, lines: &S) -> MatchResult
where
    S: LineSource + ?Sized,
{
    let Some(matcher) = pattern.matcher() else {
        return MatchResult::identity(lines.line_count());
    };

    let started = Instant::now();
    let result = select_matching(matcher, lines);
    debug!(
        "Filtered {} lines with {:?}: {} matches, {} skipped in {:?}",
        lines.line_count(),
        pattern.text(),
        result.len(),
        result.skipped(),
        started.elapsed()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_lines() -> Vec<&'static str> {
        vec![
            "ERROR: Connection failed",
            "INFO: Server started successfully",
            "DEBUG: Processing request",
            "ERROR: Invalid input",
            "WARNING: Low memory",
            "INFO: Request completed",
        ]
    }

    #[test]
    fn test_set_valid_pattern() {
        let filter = PatternFilter::new();
        assert!(filter.set_pattern("ERROR").is_ok());
        assert!(filter.has_valid_pattern());
        assert_eq!(filter.pattern(), "ERROR");
        assert_eq!(filter.error(), "");
    }

    #[test]
    fn test_set_invalid_pattern() {
        let filter = PatternFilter::new();
        let result = filter.set_pattern("[invalid(regex");

        assert!(matches!(result, Err(LogscopeError::CompileFailed { .. })));
        assert!(!filter.has_valid_pattern());
        assert!(!filter.error().is_empty());
        // Failed text still becomes current
        assert_eq!(filter.pattern(), "[invalid(regex");
    }

    #[test]
    fn test_invalid_pattern_replaces_previous() {
        let filter = PatternFilter::new();
        filter.set_pattern("ERROR").unwrap();
        let _ = filter.set_pattern("(");

        // No stale filtering with the old pattern
        let result = filter.filter(&test_lines());
        assert_eq!(result.indices(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_filter_simple_pattern() {
        let filter = PatternFilter::new();
        filter.set_pattern("ERROR").unwrap();

        let result = filter.filter(&test_lines());
        assert_eq!(result.indices(), &[0, 3]);
    }

    #[test]
    fn test_filter_regex_pattern() {
        let filter = PatternFilter::new();
        filter.set_pattern("INFO.*success").unwrap();
        assert_eq!(filter.filter(&test_lines()).indices(), &[1]);
    }

    #[test]
    fn test_filter_anchored_alternation() {
        let filter = PatternFilter::new();
        filter.set_pattern("^(ERROR|WARNING):").unwrap();
        assert_eq!(filter.filter(&test_lines()).indices(), &[0, 3, 4]);
    }

    #[test]
    fn test_filter_character_classes() {
        let filter = PatternFilter::new();
        filter.set_pattern("[Ww][Aa][Rr][Nn][Ii][Nn][Gg]").unwrap();
        assert_eq!(filter.filter(&test_lines()).indices(), &[4]);
    }

    #[test]
    fn test_filter_no_and_all_matches() {
        let filter = PatternFilter::new();
        filter.set_pattern("CRITICAL").unwrap();
        assert!(filter.filter(&test_lines()).is_empty());

        filter.set_pattern(".*").unwrap();
        assert_eq!(filter.filter(&test_lines()).len(), 6);
    }

    #[test]
    fn test_empty_pattern_is_identity() {
        let filter = PatternFilter::new();
        assert!(filter.set_pattern("").is_ok());
        assert!(!filter.has_valid_pattern());
        assert_eq!(filter.error(), "");
        assert_eq!(filter.filter(&test_lines()).indices(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_clear_pattern() {
        let filter = PatternFilter::new();
        let _ = filter.set_pattern("(");
        assert!(!filter.error().is_empty());

        filter.clear_pattern();
        assert!(!filter.has_valid_pattern());
        assert!(filter.pattern().is_empty());
        assert!(filter.error().is_empty());
    }

    #[test]
    fn test_filter_empty_input() {
        let filter = PatternFilter::new();
        filter.set_pattern("ERROR").unwrap();
        let empty: Vec<&str> = Vec::new();
        assert!(filter.filter(&empty).is_empty());
    }

    #[test]
    fn test_matches_single_line() {
        let filter = PatternFilter::new();
        assert!(!filter.matches("ERROR: x"));

        filter.set_pattern("ERROR").unwrap();
        assert!(filter.matches("ERROR: x"));
        assert!(!filter.matches("INFO: y"));
        assert!(filter.matches(b"bytes ERROR \xff".as_slice()));
    }

    #[test]
    fn test_set_options_recompiles() {
        let filter = PatternFilter::new();
        filter.set_pattern("warning").unwrap();
        assert!(filter.filter(&test_lines()).is_empty());

        filter
            .set_options(FilterOptions {
                case_insensitive: true,
                ..FilterOptions::default()
            })
            .unwrap();
        assert!(filter.options().case_insensitive);
        assert_eq!(filter.filter(&test_lines()).indices(), &[4]);
    }

    #[test]
    fn test_set_options_never_restores_older_text() {
        let filter = PatternFilter::new();
        filter.set_pattern("p0").unwrap();

        let toggler = {
            let filter = filter.clone();
            std::thread::spawn(move || {
                for round in 0..500 {
                    let options = FilterOptions {
                        case_insensitive: round % 2 == 0,
                        ..FilterOptions::default()
                    };
                    filter.set_options(options).unwrap();
                }
            })
        };

        let mut reverted = 0;
        for round in 1..500 {
            let text = format!("p{}", round);
            filter.set_pattern(&text).unwrap();
            if filter.pattern() != text {
                reverted += 1;
            }
        }
        toggler.join().unwrap();

        assert_eq!(reverted, 0);
        assert_eq!(filter.pattern(), "p499");
    }

    #[test]
    fn test_set_options_reports_compile_failure() {
        let filter = PatternFilter::with_options(FilterOptions {
            regex_mode: false,
            ..FilterOptions::default()
        });
        filter.set_pattern("[x(").unwrap();
        let before = filter.generation();

        let result = filter.set_options(FilterOptions::default());
        assert!(matches!(result, Err(LogscopeError::CompileFailed { .. })));
        assert!(!filter.has_valid_pattern());
        assert_eq!(filter.pattern(), "[x(");
        assert!(filter.generation() > before);
    }

    #[test]
    fn test_generation_advances() {
        let filter = PatternFilter::new();
        let start = filter.generation();

        filter.set_pattern("ERROR").unwrap();
        let after_set = filter.generation();
        assert!(after_set > start);
        assert!(filter.is_current(after_set));

        filter.clear_pattern();
        assert!(!filter.is_current(after_set));
    }

    #[test]
    fn test_clones_share_state() {
        let filter = PatternFilter::new();
        let clone = filter.clone();
        filter.set_pattern("INFO").unwrap();
        assert_eq!(clone.pattern(), "INFO");
        assert_eq!(clone.filter(&test_lines()).indices(), &[1, 5]);
    }

    #[test]
    fn test_filter_async_matches_sync() {
        let filter = PatternFilter::new();
        filter.set_pattern("INFO").unwrap();

        let sync = filter.filter(&test_lines());
        let pending = filter.filter_async(test_lines());
        assert!(filter.is_current(pending.generation()));
        assert_eq!(pending.pattern(), "INFO");

        let background = pending.blocking_wait().unwrap();
        assert_eq!(background, sync);
        assert_eq!(background.indices(), &[1, 5]);
    }

    #[test]
    fn test_filter_async_uses_pattern_at_scheduling() {
        let filter = PatternFilter::new();
        filter.set_pattern("ERROR").unwrap();

        let pending = filter.filter_async(test_lines());
        filter.set_pattern("INFO").unwrap();

        assert!(!filter.is_current(pending.generation()));
        assert_eq!(pending.blocking_wait().unwrap().indices(), &[0, 3]);
    }
}
