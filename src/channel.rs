//! Buffered byte channel with a low-water wakeup threshold.
//!
//! Each session owns a pair of these: one accumulating bytes received from
//! the transport but not yet parsed, one accumulating serialized output not
//! yet written. Uses `bytes::BytesMut` so consuming from the front is an
//! O(1) split rather than a memmove.

use bytes::{Bytes, BytesMut};

use crate::error::{Result, SpdyError};
use crate::protocol::HEADER_SIZE;

/// Initial backing capacity for a channel.
const INITIAL_CAPACITY: usize = 16 * 1024;

/// Append-only byte accumulator with a watermark.
///
/// The watermark is the minimum buffered byte count before the owner wants
/// to be notified again; it is the contract with the transport driver, which
/// must not invoke the reassembly engine until `available() >= watermark()`.
#[derive(Debug)]
pub struct BufferedChannel {
    buf: BytesMut,
    watermark: usize,
}

impl BufferedChannel {
    /// Create a channel with the watermark at the frame header size.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_CAPACITY),
            watermark: HEADER_SIZE,
        }
    }

    /// Append bytes to the back of the channel. Never blocks, never drops.
    pub fn append(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Remove and return the first `n` bytes.
    ///
    /// Fails with [`SpdyError::BufferUnderflow`] if fewer than `n` bytes are
    /// buffered; callers check [`available`](Self::available) first.
    pub fn consume(&mut self, n: usize) -> Result<Bytes> {
        if n > self.buf.len() {
            return Err(SpdyError::BufferUnderflow {
                requested: n,
                available: self.buf.len(),
            });
        }
        Ok(self.buf.split_to(n).freeze())
    }

    /// Remove and return everything buffered.
    pub fn take(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    /// Borrow the buffered bytes without consuming them.
    pub fn peek(&self) -> &[u8] {
        &self.buf
    }

    /// Number of buffered bytes.
    #[inline]
    pub fn available(&self) -> usize {
        self.buf.len()
    }

    /// Check whether the channel is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Set the notification threshold.
    pub fn set_watermark(&mut self, n: usize) {
        self.watermark = n;
    }

    /// Current notification threshold.
    #[inline]
    pub fn watermark(&self) -> usize {
        self.watermark
    }
}

impl Default for BufferedChannel {
    fn default() -> Self {
        Self::new()
    }
}
