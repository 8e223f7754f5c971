//! Error types for the sediment engine.

use thiserror::Error;

use crate::codec::Algorithm;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, SedimentError>;

/// All errors that can surface from the engine.
///
/// A missing key is not an error; `get` variants return `Ok(None)`.
#[derive(Debug, Error)]
pub enum SedimentError {
    /// Wraps standard I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A persistence file is malformed or truncated.
    #[error("Corrupt {file}: {reason}")]
    Corrupt {
        /// File that failed to parse.
        file: String,
        /// Description of the failure.
        reason: String,
    },

    /// A codec reported corruption, or decode produced the wrong length.
    #[error("Decode failed ({algorithm:?}): {reason}")]
    DecodeFailed {
        /// Algorithm the bytes were recorded as encoded with.
        algorithm: Algorithm,
        /// Description of the failure.
        reason: String,
    },

    /// A codec failed to encode. Internal: the dispatcher downgrades to
    /// `Algorithm::None` before this reaches a caller.
    #[error("Encode failed ({algorithm:?}): {reason}")]
    EncodeFailed {
        /// Algorithm that failed.
        algorithm: Algorithm,
        /// Description of the failure.
        reason: String,
    },

    /// A chunk range was out of bounds or inverted.
    #[error("Invalid chunk range [{start}, {end}] for blob with {num_chunks} chunks")]
    RangeInvalid {
        /// First requested chunk index.
        start: u32,
        /// Last requested chunk index (inclusive).
        end: u32,
        /// Number of chunks the blob actually has.
        num_chunks: u32,
    },
}
