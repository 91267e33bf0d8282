//! Error types for RIPPLE operations.
//!
//! Two families live here:
//!
//! - **Outcomes** the caller reports as notices: `NoSymbol`, `NoReferences`
//! - **Failures**: lookup, I/O, configuration and serialization errors
//!
//! Line-read failures (`Io`, `LineOutOfRange`, `FileTooLarge`) are recovered inside the graph
//! builder and only surface from a `LineSource` called directly.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for RIPPLE operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Nothing identifier-like under the cursor
    #[error("no symbol found at {}:{}:{}", file.display(), line + 1, column + 1)]
    NoSymbol {
        file: PathBuf,
        line: usize,
        column: usize,
    },

    /// The symbol resolved but nothing references it
    #[error("no references found for `{symbol}`")]
    NoReferences { symbol: String },

    /// The reference-resolution collaborator failed
    #[error("reference lookup failed: {0}")]
    Lookup(String),

    #[error("line {} is out of range in {}", line + 1, file.display())]
    LineOutOfRange { file: PathBuf, line: usize },

    #[error("{} is {size} bytes, over the {limit} byte limit", file.display())]
    FileTooLarge { file: PathBuf, size: u64, limit: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    #[error("malformed config file: {0}")]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// True for outcomes that are informational rather than failures.
    pub fn is_notice(&self) -> bool {
        matches!(self, Error::NoSymbol { .. } | Error::NoReferences { .. })
    }
}
