//! Wire format encoding and decoding for the fixed 8-byte frame header.
//!
//! ```text
//! Control frame:
//! ┌─┬──────────────┬──────────────┬───────┬────────────────┐
//! │C│ Version      │ Type         │ Flags │ Length         │
//! │1│ 15 bits      │ 16 bits      │ 8 bits│ 24 bits        │
//! └─┴──────────────┴──────────────┴───────┴────────────────┘
//! Data frame:
//! ┌─┬─────────────────────────────┬───────┬────────────────┐
//! │C│ Stream ID                   │ Flags │ Length         │
//! │0│ 31 bits                     │ 8 bits│ 24 bits        │
//! └─┴─────────────────────────────┴───────┴────────────────┘
//! ```
//!
//! The high bit of the first 32-bit word (`C`) selects control vs data
//! framing. All multi-byte integers are Big Endian.

use crate::error::{Result, SpdyError};

/// Header size in bytes (fixed, exactly 8).
pub const HEADER_SIZE: usize = 8;

/// Protocol version this implementation speaks.
pub const PROTOCOL_VERSION: u16 = 2;

/// Maximum accepted payload length. Frames declaring this much or more are
/// a protocol violation, fatal to the session.
pub const MAX_FRAME_LENGTH: u32 = 1 << 20;

/// Control-bit mask in the first 32-bit word.
const CONTROL_BIT: u32 = 0x8000_0000;

/// Control frame type codes.
///
/// The enum is closed over the types the protocol defines; codes outside it
/// decode to `None` so the dispatcher can tell "unimplemented" apart from
/// "invalid".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ControlType {
    SynStream = 1,
    SynReply = 2,
    RstStream = 3,
    Settings = 4,
    Ping = 6,
    Goaway = 7,
    Headers = 8,
    WindowUpdate = 9,
}

impl ControlType {
    /// Map a wire type code to a known control type.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::SynStream),
            2 => Some(Self::SynReply),
            3 => Some(Self::RstStream),
            4 => Some(Self::Settings),
            6 => Some(Self::Ping),
            7 => Some(Self::Goaway),
            8 => Some(Self::Headers),
            9 => Some(Self::WindowUpdate),
            _ => None,
        }
    }

    /// The wire type code for this control type.
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// Discriminated part of a frame header.
///
/// Exactly one of the control/data field sets exists per frame, selected by
/// the high bit on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Control frame: protocol-management data.
    Control {
        /// 15-bit protocol version.
        version: u16,
        /// 16-bit control type code (may be unknown, see [`ControlType`]).
        frame_type: u16,
    },
    /// Data frame: stream payload bytes.
    Data {
        /// 31-bit stream identifier.
        stream_id: u32,
    },
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Control or data framing, with the kind-specific fields.
    pub kind: FrameKind,
    /// Flags byte.
    pub flags: u8,
    /// Payload length in bytes (24-bit on the wire).
    pub length: u32,
}

impl FrameHeader {
    /// Build a control frame header for a known control type.
    pub fn control(frame_type: ControlType, flags: u8, length: u32) -> Self {
        Self {
            kind: FrameKind::Control {
                version: PROTOCOL_VERSION,
                frame_type: frame_type.code(),
            },
            flags,
            length,
        }
    }

    /// Build a data frame header.
    pub fn data(stream_id: u32, flags: u8, length: u32) -> Self {
        Self {
            kind: FrameKind::Data {
                stream_id: stream_id & 0x7FFF_FFFF,
            },
            flags,
            length,
        }
    }

    /// Check whether this is a control frame.
    #[inline]
    pub fn is_control(&self) -> bool {
        matches!(self.kind, FrameKind::Control { .. })
    }

    /// Decode a header from wire bytes.
    ///
    /// Callers must guarantee at least [`HEADER_SIZE`] bytes; shorter input
    /// fails with [`SpdyError::Truncated`]. No upper-bound check is made on
    /// the declared length here; that is the reassembly engine's job.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(SpdyError::Truncated {
                needed: HEADER_SIZE,
                have: buf.len(),
            });
        }

        let word = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let kind = if word & CONTROL_BIT != 0 {
            FrameKind::Control {
                version: ((word >> 16) & 0x7FFF) as u16,
                frame_type: (word & 0xFFFF) as u16,
            }
        } else {
            FrameKind::Data {
                stream_id: word & 0x7FFF_FFFF,
            }
        };

        Ok(Self {
            kind,
            flags: buf[4],
            length: u32::from_be_bytes([0, buf[5], buf[6], buf[7]]),
        })
    }

    /// Encode this header into `buf`, returning the byte count written
    /// (always [`HEADER_SIZE`]).
    ///
    /// Fails with [`SpdyError::BufferTooSmall`] if `buf` cannot hold it.
    pub fn marshal(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < HEADER_SIZE {
            return Err(SpdyError::BufferTooSmall {
                needed: HEADER_SIZE,
                have: buf.len(),
            });
        }

        let word = match self.kind {
            FrameKind::Control {
                version,
                frame_type,
            } => CONTROL_BIT | (u32::from(version & 0x7FFF) << 16) | u32::from(frame_type),
            FrameKind::Data { stream_id } => stream_id & 0x7FFF_FFFF,
        };

        buf[0..4].copy_from_slice(&word.to_be_bytes());
        buf[4] = self.flags;
        let len = self.length.to_be_bytes();
        buf[5..8].copy_from_slice(&len[1..4]);
        Ok(HEADER_SIZE)
    }
}
