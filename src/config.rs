//! Configuration for file loading and filtering.
//!
//! Every setting has a default, so `Config::default()` is always usable. With the
//! `config` feature enabled the same structure can be read from a TOML file:
//!
//! ```toml
//! [reader]
//! strategy = "auto"          # auto | memory_mapped | buffered | windowed
//! max_map_size = 2147483648
//! window_size = 67108864
//! estimated_line_length = 120
//!
//! [filter]
//! case_insensitive = true
//! regex_mode = true
//! whole_word = false
//! ```

use crate::file_handler::AccessStrategy;
use crate::file_handler::line_index::DEFAULT_ESTIMATED_LINE_LENGTH;
use crate::file_handler::windowed::DEFAULT_WINDOW_SIZE;
use crate::filter::FilterOptions;

#[cfg(feature = "config")]
use crate::error::{LogscopeError, Result};
#[cfg(feature = "config")]
use std::path::{Path, PathBuf};

/// Largest file [`AccessStrategy::Auto`] tries to map in one piece
///
/// Unbounded: whether a mapping fits is left to the mapping itself, with the
/// buffered and windowed fallbacks behind it.
pub const DEFAULT_MAX_MAP_SIZE: u64 = u64::MAX;

/// Settings for [`LineIndexedFile`](crate::LineIndexedFile)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ReaderConfig {
    /// How file bytes are loaded
    pub strategy: AccessStrategy,

    /// Files above this size are buffered instead of mapped under `Auto`
    pub max_map_size: u64,

    /// Span of one mapping window when a file is served in windows
    pub window_size: usize,

    /// Average line length used to pre-size the line index (allocation hint only)
    pub estimated_line_length: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            strategy: AccessStrategy::Auto,
            max_map_size: DEFAULT_MAX_MAP_SIZE,
            window_size: DEFAULT_WINDOW_SIZE,
            estimated_line_length: DEFAULT_ESTIMATED_LINE_LENGTH,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct Config {
    pub reader: ReaderConfig,
    pub filter: FilterOptions,
}

#[cfg(feature = "config")]
impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| LogscopeError::config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LogscopeError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Default location: `<config dir>/logscope/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("logscope").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when no file exists
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}
