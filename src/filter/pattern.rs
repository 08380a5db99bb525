//! Pattern compilation on top of the ripgrep regex engine.
//!
//! A [`CompiledPattern`] is an immutable snapshot: the source text, the matcher
//! built from it (if compilation succeeded), and the error otherwise. Changing
//! the pattern always builds a new snapshot.

use grep_regex::{RegexMatcher, RegexMatcherBuilder};

/// Prefix of every compile error message
const COMPILE_ERROR_PREFIX: &str = "Regex error: ";

/// How pattern text is interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct FilterOptions {
    /// Match letters regardless of case
    pub case_insensitive: bool,

    /// Treat the pattern as a regular expression; when false it is matched literally
    pub regex_mode: bool,

    /// Only match at word boundaries
    pub whole_word: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            regex_mode: true,
            whole_word: false,
        }
    }
}

/// Result of the most recent compilation attempt
///
/// - empty text: no matcher, no error (filtering disabled)
/// - valid text: matcher present, no error
/// - invalid text: no matcher, error present
#[derive(Debug, Clone, Default)]
pub struct CompiledPattern {
    text: String,
    matcher: Option<RegexMatcher>,
    error: Option<String>,
}

impl CompiledPattern {
    /// Compile `text` with `options`
    ///
    /// Matching is unanchored substring search unless the pattern itself anchors.
    pub fn compile(text: &str, options: &FilterOptions) -> Self {
        if text.is_empty() {
            return Self::default();
        }

        let built = RegexMatcherBuilder::new()
            .case_insensitive(options.case_insensitive)
            .fixed_strings(!options.regex_mode)
            .word(options.whole_word)
            .build(text);

        match built {
            Ok(matcher) => Self {
                text: text.to_string(),
                matcher: Some(matcher),
                error: None,
            },
            Err(e) => Self {
                text: text.to_string(),
                matcher: None,
                error: Some(format!("{}{}", COMPILE_ERROR_PREFIX, e)),
            },
        }
    }

    /// Source text this snapshot was built from
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Compiled matcher, present only when compilation succeeded
    pub fn matcher(&self) -> Option<&RegexMatcher> {
        self.matcher.as_ref()
    }

    /// True iff compilation succeeded
    pub fn is_valid(&self) -> bool {
        self.matcher.is_some()
    }

    /// Compile error, if the text was rejected
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
