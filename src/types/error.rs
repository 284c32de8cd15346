//! Custom error types for the mcpl-phits crate.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A file could not be opened or created.
    #[error("could not open file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A caller-supplied option or argument is not acceptable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The file is structurally invalid or does not follow the expected layout.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A record ended before its declared length was read.
    #[error("truncated {context}: expected {expected} bytes, but found {found} bytes")]
    Truncated {
        context: &'static str,
        expected: u64,
        found: u64,
    },

    /// The trailing record marker disagrees with the leading one.
    #[error("record marker mismatch: leading marker is {leading}, trailing marker is {trailing}")]
    MarkerMismatch { leading: u64, trailing: u64 },

    /// An operation was attempted in the wrong order (e.g. header edits after particles).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Ancillary file is too small to be what it claims to be.
    #[error("file {} is suspiciously short ({size} bytes)", path.display())]
    FileTooShort { path: PathBuf, size: u64 },

    /// Ancillary file exceeds the embedding limit.
    #[error("file {} is larger than {limit} bytes ({size} bytes)", path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    /// Ancillary file contains bytes outside the accepted text ranges.
    #[error("file {} does not appear to be a text file", path.display())]
    NotText { path: PathBuf },

    /// Ancillary file lacks the keyword every valid file of its kind carries.
    #[error("file {} looks invalid as it does not contain the word \"{keyword}\"", path.display())]
    MissingKeyword {
        path: PathBuf,
        keyword: &'static str,
    },
}

/// A convenience `Result` type alias using the crate's `ConvertError` type.
pub type Result<T> = std::result::Result<T, ConvertError>;
