//! Fixed-layout control frame bodies.
//!
//! Implements the two bodies the framing core needs: the stream-open request
//! (SYN_STREAM) on the inbound side and the stream-reset (RST_STREAM) on
//! both sides. Bodies are fixed-size Big Endian structures; the variable
//! name/value header block that follows a SYN_STREAM body is not decoded.

use crate::error::{Result, SpdyError};

/// Stream-reset status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    ProtocolError,
    InvalidStream,
    RefusedStream,
    UnsupportedVersion,
    Cancel,
    InternalError,
    FlowControlError,
    /// A code this implementation does not know. Preserved so inbound
    /// resets round-trip unchanged.
    Unknown(u32),
}

impl StatusCode {
    /// Decode a wire status code.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::ProtocolError,
            2 => Self::InvalidStream,
            3 => Self::RefusedStream,
            4 => Self::UnsupportedVersion,
            5 => Self::Cancel,
            6 => Self::InternalError,
            7 => Self::FlowControlError,
            other => Self::Unknown(other),
        }
    }

    /// The wire value for this status code.
    pub fn code(self) -> u32 {
        match self {
            Self::ProtocolError => 1,
            Self::InvalidStream => 2,
            Self::RefusedStream => 3,
            Self::UnsupportedVersion => 4,
            Self::Cancel => 5,
            Self::InternalError => 6,
            Self::FlowControlError => 7,
            Self::Unknown(code) => code,
        }
    }
}

/// Stream-open request body (SYN_STREAM).
///
/// Fixed 12-byte layout: 31-bit stream id, 31-bit associated stream id,
/// 2-bit priority, one unused byte, then the 16-bit header-pair count that
/// opens the name/value block. The block itself is left unparsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynStream {
    /// Stream identifier (nonzero for a valid open; parity is the stream
    /// layer's concern, not enforced here).
    pub stream_id: u32,
    /// Stream this one is associated with, or 0.
    pub associated_stream_id: u32,
    /// 2-bit priority, 0 = highest.
    pub priority: u8,
    /// Number of name/value header pairs declared by the block.
    pub header_count: u32,
}

impl SynStream {
    /// Fixed body layout size in bytes.
    pub const SIZE: usize = 12;

    /// Decode the fixed body layout from `buf`.
    ///
    /// Fails with [`SpdyError::Truncated`] if `buf` is shorter than the
    /// fixed layout. Bytes beyond it (the header block) are ignored.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::SIZE {
            return Err(SpdyError::Truncated {
                needed: Self::SIZE,
                have: buf.len(),
            });
        }

        Ok(Self {
            stream_id: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) & 0x7FFF_FFFF,
            associated_stream_id: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]])
                & 0x7FFF_FFFF,
            priority: buf[8] >> 6,
            header_count: u32::from(u16::from_be_bytes([buf[10], buf[11]])),
        })
    }
}

/// Stream-reset body (RST_STREAM).
///
/// Fixed 8-byte layout: 31-bit stream id, 32-bit status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RstStream {
    /// Stream being reset.
    pub stream_id: u32,
    /// Why the stream is being reset.
    pub status: StatusCode,
}

impl RstStream {
    /// Fixed body size in bytes.
    pub const SIZE: usize = 8;

    /// Decode the body from `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::SIZE {
            return Err(SpdyError::Truncated {
                needed: Self::SIZE,
                have: buf.len(),
            });
        }

        Ok(Self {
            stream_id: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) & 0x7FFF_FFFF,
            status: StatusCode::from_code(u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]])),
        })
    }

    /// Encode the body into `buf`, returning the byte count written
    /// (always [`RstStream::SIZE`]).
    pub fn marshal(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < Self::SIZE {
            return Err(SpdyError::BufferTooSmall {
                needed: Self::SIZE,
                have: buf.len(),
            });
        }

        buf[0..4].copy_from_slice(&(self.stream_id & 0x7FFF_FFFF).to_be_bytes());
        buf[4..8].copy_from_slice(&self.status.code().to_be_bytes());
        Ok(Self::SIZE)
    }
}
