//! Read-only byte sources backing an open file
//!
//! A ByteSource is acquired once per `open` and released when dropped. Which
//! variant is used depends on the configured [`AccessStrategy`]; the bytes are
//! never mutated while the source is alive.

use crate::config::ReaderConfig;
use crate::error::{LogscopeError, Result};
use crate::file_handler::validation::addressable_len;
use crate::file_handler::{AccessStrategy, SourceKind};
use log::{debug, warn};
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Internal byte storage for an open file
#[derive(Debug)]
pub enum ByteSource {
    /// Content accessed via a read-only memory mapping
    Mapped(Mmap),
    /// Content read once into memory (mapping not feasible or not wanted)
    Buffered(Vec<u8>),
}

impl ByteSource {
    /// Load the whole content of an opened, non-empty file
    ///
    /// # Arguments
    /// * `path` - Path used for error messages
    /// * `file` - Handle opened for reading
    /// * `file_size` - Size reported by the file metadata
    /// * `config` - Strategy and size limits
    ///
    /// Under `Auto` the file is mapped first. If that fails, or the file is
    /// above `max_map_size`, it is read into a buffer instead, and if that
    /// fails too the mapping is retried. `Windowed` loads the same way; a file
    /// opened with it never gets here.
    ///
    /// # Errors
    /// * `MapFailed` if the content can be neither mapped nor buffered, or does
    ///   not fit in the address space
    pub fn load(path: &Path, file: &File, file_size: u64, config: &ReaderConfig) -> Result<Self> {
        Self::load_with(path, file, file_size, config, Self::map)
    }

    fn load_with<M>(
        path: &Path,
        file: &File,
        file_size: u64,
        config: &ReaderConfig,
        map: M,
    ) -> Result<Self>
    where
        M: Fn(&Path, &File) -> Result<Self>,
    {
        let len = addressable_len(path, file_size)?;

        match config.strategy {
            AccessStrategy::MemoryMapped => map(path, file),
            AccessStrategy::Buffered => Self::read(path, file, len),
            AccessStrategy::Auto | AccessStrategy::Windowed
                if file_size > config.max_map_size =>
            {
                debug!(
                    "{} is {} bytes, above the {} byte mapping limit; buffering",
                    path.display(),
                    file_size,
                    config.max_map_size
                );
                Self::read(path, file, len).or_else(|read_err| {
                    warn!("{}; trying a mapping instead", read_err);
                    map(path, file).map_err(|_| read_err)
                })
            }
            AccessStrategy::Auto | AccessStrategy::Windowed => match map(path, file) {
                Ok(source) => Ok(source),
                Err(map_err) => {
                    warn!("{}; falling back to a buffered read", map_err);
                    Self::read(path, file, len).map_err(|_| map_err)
                }
            },
        }
    }

    fn map(path: &Path, file: &File) -> Result<Self> {
        // SAFETY: the mapping is read-only and private to this process. Truncating
        // the file underneath it is outside what a log viewer can defend against.
        let mmap = unsafe { Mmap::map(file) }.map_err(|e| {
            LogscopeError::map_failed(path, "memory mapping failed", Some(e))
        })?;

        // Indexing scans front to back; non-fatal if the kernel ignores the hint
        #[cfg(unix)]
        {
            if let Err(e) = mmap.advise(memmap2::Advice::Sequential) {
                warn!("Failed to set mmap advice for {}: {}", path.display(), e);
            }
        }

        Ok(Self::Mapped(mmap))
    }

    fn read(path: &Path, file: &File, len: usize) -> Result<Self> {
        let mut content = Vec::new();
        content
            .try_reserve_exact(len)
            .map_err(|e| LogscopeError::map_failed(path, e.to_string(), None))?;

        let mut reader = file;
        reader.read_to_end(&mut content).map_err(|e| {
            LogscopeError::map_failed(path, "buffered read failed", Some(e))
        })?;

        Ok(Self::Buffered(content))
    }

    /// Get the underlying bytes as a slice regardless of storage strategy
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ByteSource::Mapped(mmap) => &mmap[..],
            ByteSource::Buffered(content) => content.as_slice(),
        }
    }

    /// Number of bytes held
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// True when no bytes are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Which storage strategy is in use
    pub fn kind(&self) -> SourceKind {
        match self {
            ByteSource::Mapped(_) => SourceKind::Mapped,
            ByteSource::Buffered(_) => SourceKind::Buffered,
        }
    }
}
