//! Protocol module - wire format and control message codecs.
//!
//! This module implements the bit-exact wire layer:
//! - 8-byte header encoding/decoding with the control/data discriminant
//! - Fixed-layout control frame bodies (SYN_STREAM, RST_STREAM)

mod message;
mod wire_format;

pub use message::{RstStream, StatusCode, SynStream};
pub use wire_format::{
    ControlType, FrameHeader, FrameKind, HEADER_SIZE, MAX_FRAME_LENGTH, PROTOCOL_VERSION,
};
