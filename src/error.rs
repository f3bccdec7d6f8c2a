//! Error types for MIME decoding

use thiserror::Error;

/// Errors that can occur while decoding.
///
/// None of these escape the decoding entry points: they are turned into a
/// sentinel string or a lossy conversion at the call site.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The charset label is not known to the transcoder
    #[error("Unknown charset: {0}")]
    UnknownCharset(String),

    /// The input is not valid in the declared charset
    #[error("Malformed {charset} byte sequence")]
    Malformed { charset: String },

    /// Raw header bytes could not be parsed
    #[error("Failed to parse headers: {0}")]
    Headers(String),
}

/// Result type for decoding operations
pub type Result<T> = std::result::Result<T, DecodeError>;
