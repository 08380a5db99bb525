//! Regex filtering over indexed lines.
//!
//! [`PatternFilter`] owns the active pattern and evaluates it either on the
//! calling thread or on a background thread. [`FilterView`] tracks which lines
//! of a file are visible under the current filter.

pub mod engine;
pub mod matches;
pub mod pattern;
pub mod task;
pub mod view;

pub use engine::PatternFilter;
pub use matches::{select_matching, MatchResult};
pub use pattern::{CompiledPattern, FilterOptions};
pub use task::PendingMatches;
pub use view::FilterView;
