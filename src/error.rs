//! Error types for spdyframe.

use thiserror::Error;

/// Main error type for all framing operations.
#[derive(Debug, Error)]
pub enum SpdyError {
    /// I/O error on the underlying connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Not enough bytes to decode a fixed-size structure.
    ///
    /// At the codec level this is not a protocol failure; the reassembly
    /// engine absorbs it by raising the input watermark instead. A truncated
    /// fixed-size control body that reaches the dispatcher is fatal.
    #[error("truncated input: need {needed} bytes, have {have}")]
    Truncated { needed: usize, have: usize },

    /// Output buffer cannot hold a fixed-size encoding.
    #[error("buffer too small: need {needed} bytes, have {have}")]
    BufferTooSmall { needed: usize, have: usize },

    /// A frame declared a payload length at or above the maximum.
    /// Fatal to the session.
    #[error("oversized frame: declared payload of {length} bytes, maximum is {max}")]
    OversizedFrame { length: u32, max: u32 },

    /// Attempt to consume more bytes than a channel holds.
    /// Precondition violation, fatal to the session.
    #[error("buffer underflow: tried to consume {requested} bytes, {available} available")]
    BufferUnderflow { requested: usize, available: usize },

    /// Connection closed by the peer.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Result type alias using SpdyError.
pub type Result<T> = std::result::Result<T, SpdyError>;
