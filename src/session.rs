//! Per-connection session: frame reassembly, control dispatch, lifecycle.
//!
//! A [`Session`] owns one input/output [`BufferedChannel`] pair and runs the
//! reassembly engine to completion inside each `DataReady` notification.
//! There is no internal suspension point and no shared state with other
//! sessions, so the whole thing is single-threaded per connection and needs
//! no locking.
//!
//! The engine's backpressure contract: after every invocation the input
//! watermark is either `HEADER_SIZE` (no pending partial frame) or
//! `HEADER_SIZE + pending payload length` (one specific frame awaited), so
//! the transport never wakes the session for less data than it can act on,
//! and the session never buffers more than one frame's worth beyond what it
//! has already parsed.

use bytes::Bytes;

use crate::channel::BufferedChannel;
use crate::error::{Result, SpdyError};
use crate::protocol::{
    ControlType, FrameHeader, FrameKind, RstStream, StatusCode, SynStream, HEADER_SIZE,
    MAX_FRAME_LENGTH, PROTOCOL_VERSION,
};

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Frames declaring a payload at or above this length are a protocol
    /// violation, fatal to the session.
    pub max_frame_length: u32,
    /// Read buffer size used by the transport driver.
    pub read_chunk_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_frame_length: MAX_FRAME_LENGTH,
            read_chunk_size: 16 * 1024,
        }
    }
}

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connection handle received, channels initialized, no data yet.
    Accepting,
    /// Processing readable/writable notifications.
    Active,
    /// Fatal error or EOF seen; waiting for the connection to be released.
    Closing,
    /// Connection released. No further notifications are honored.
    Closed,
}

/// Transport notifications delivered to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoEvent {
    /// At least `watermark` bytes are buffered on the input channel.
    DataReady,
    /// Previously queued output was written out. Bookkeeping only; output
    /// is fully serialized before it is queued, so nothing to do.
    Flushed,
    /// Peer closed the connection.
    Eof,
    /// The transport failed.
    TransportError,
}

impl SessionState {
    /// Pure lifecycle transition on a notification.
    ///
    /// Fatal parse/validation outcomes are applied separately by
    /// [`Session::handle`]; this covers the transport-driven edges.
    pub fn transition(self, event: IoEvent) -> SessionState {
        match (self, event) {
            (SessionState::Closed, _) => SessionState::Closed,
            (SessionState::Closing, _) => SessionState::Closing,
            (_, IoEvent::Eof | IoEvent::TransportError) => SessionState::Closing,
            (SessionState::Accepting, IoEvent::DataReady) => SessionState::Active,
            (state, _) => state,
        }
    }
}

/// One framing session, 1:1 with an accepted connection.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    input: BufferedChannel,
    output: BufferedChannel,
    config: SessionConfig,
}

impl Session {
    /// Create a session for a freshly accepted connection.
    ///
    /// Both channel watermarks start at [`HEADER_SIZE`].
    pub fn new(config: SessionConfig) -> Self {
        Self {
            state: SessionState::Accepting,
            input: BufferedChannel::new(),
            output: BufferedChannel::new(),
            config,
        }
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check whether the session has been torn down.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Closing | SessionState::Closed)
    }

    /// Append transport bytes to the input channel.
    pub fn append_input(&mut self, data: &[u8]) {
        self.input.append(data);
    }

    /// Bytes buffered on the input channel.
    #[inline]
    pub fn input_available(&self) -> usize {
        self.input.available()
    }

    /// Minimum input bytes required before the next `DataReady`.
    #[inline]
    pub fn read_watermark(&self) -> usize {
        self.input.watermark()
    }

    /// Check whether serialized output is waiting to be written.
    #[inline]
    pub fn has_output(&self) -> bool {
        !self.output.is_empty()
    }

    /// Drain the output channel for the transport's send path.
    pub fn take_output(&mut self) -> Bytes {
        self.output.take()
    }

    /// Release the session after the connection handle is closed.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    /// Deliver a transport notification.
    ///
    /// `DataReady` runs the reassembly engine; a fatal framing error moves
    /// the session to `Closing` and is returned so the driver can release
    /// the connection. Notifications after teardown are ignored.
    pub fn handle(&mut self, event: IoEvent) -> Result<()> {
        if self.is_closed() {
            tracing::debug!(state = ?self.state, ?event, "ignoring event after teardown");
            return Ok(());
        }

        self.state = self.state.transition(event);

        match event {
            IoEvent::DataReady => {
                if self.input.available() < self.input.watermark() {
                    // Transport woke us early; nothing actionable yet.
                    return Ok(());
                }
                if let Err(e) = self.consume_frames() {
                    tracing::error!("fatal framing error: {e}");
                    self.state = SessionState::Closing;
                    return Err(e);
                }
                Ok(())
            }
            IoEvent::Flushed => Ok(()),
            IoEvent::Eof | IoEvent::TransportError => {
                tracing::debug!(?event, "tearing down session");
                Ok(())
            }
        }
    }

    /// The reassembly loop: extract and dispatch every complete frame,
    /// then park the watermark where the next wakeup makes progress.
    fn consume_frames(&mut self) -> Result<()> {
        loop {
            if self.input.available() < HEADER_SIZE {
                self.input.set_watermark(HEADER_SIZE);
                return Ok(());
            }

            // Peek the header without consuming it; the frame may not be
            // complete yet.
            let header = FrameHeader::parse(self.input.peek())?;
            let payload_len = header.length as usize;

            if header.length >= self.config.max_frame_length {
                return Err(SpdyError::OversizedFrame {
                    length: header.length,
                    max: self.config.max_frame_length,
                });
            }

            if self.input.available() < HEADER_SIZE + payload_len {
                // Don't ask to be woken until the whole frame is here.
                self.input.set_watermark(HEADER_SIZE + payload_len);
                return Ok(());
            }

            self.input.consume(HEADER_SIZE)?;
            let payload = self.input.consume(payload_len)?;

            match header.kind {
                FrameKind::Control {
                    version,
                    frame_type,
                } => {
                    tracing::debug!(
                        version,
                        frame_type,
                        flags = header.flags,
                        len = payload_len,
                        "control frame"
                    );
                    if version != PROTOCOL_VERSION {
                        tracing::warn!(
                            "client is version {version}, but we implement version \
                             {PROTOCOL_VERSION}"
                        );
                    }
                    self.dispatch_control(frame_type, &payload)?;
                }
                FrameKind::Data { stream_id } => {
                    tracing::debug!(
                        stream_id,
                        flags = header.flags,
                        len = payload_len,
                        "data frame"
                    );
                    tracing::error!("no data frame support yet");
                }
            }

            if self.input.available() < HEADER_SIZE {
                self.input.set_watermark(HEADER_SIZE);
                return Ok(());
            }
        }
    }

    /// Route a fully buffered control frame by type code.
    ///
    /// Recognized-but-unimplemented types are logged and ignored; so are
    /// unrecognized type codes, which the protocol requires tolerating.
    /// Only a malformed fixed-size body is fatal.
    fn dispatch_control(&mut self, frame_type: u16, payload: &[u8]) -> Result<()> {
        match ControlType::from_code(frame_type) {
            Some(ControlType::SynStream) => {
                let syn = SynStream::parse(payload)?;
                tracing::debug!(
                    stream = syn.stream_id,
                    associated = syn.associated_stream_id,
                    priority = syn.priority,
                    headers = syn.header_count,
                    "SYN_STREAM"
                );
                // Reject-all admission policy: refuse every new stream.
                self.reset_stream(syn.stream_id, StatusCode::RefusedStream)
            }
            Some(other) => {
                tracing::debug!("control frame type {other:?} not implemented yet");
                Ok(())
            }
            None => {
                tracing::error!("ignoring invalid control frame type {frame_type}");
                Ok(())
            }
        }
    }

    /// Serialize a RST_STREAM frame into the output channel.
    fn reset_stream(&mut self, stream_id: u32, status: StatusCode) -> Result<()> {
        let header = FrameHeader::control(ControlType::RstStream, 0, RstStream::SIZE as u32);
        let rst = RstStream { stream_id, status };

        let mut buf = [0u8; HEADER_SIZE + RstStream::SIZE];
        let mut nbytes = header.marshal(&mut buf)?;
        nbytes += rst.marshal(&mut buf[nbytes..])?;

        tracing::debug!(stream_id, ?status, "resetting stream");
        self.output.append(&buf[..nbytes]);
        Ok(())
    }
}
