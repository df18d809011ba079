//! # spdyframe
//!
//! Framing layer for a SPDY-style multiplexed binary stream protocol.
//!
//! The crate turns an unbounded, arbitrarily chunked incoming byte stream
//! into discrete frames, classifies each as a control or stream-data frame,
//! and dispatches control frames to type-specific handling. Backpressure is
//! watermark-driven: the reassembly engine tells the transport exactly how
//! many bytes it needs before the next wakeup, so a slow or stalled peer
//! costs no more memory than one frame's worth of buffering.
//!
//! ## Architecture
//!
//! - [`protocol`]: bit-exact header and control-body codecs
//! - [`BufferedChannel`]: input/output byte accumulators with watermarks
//! - [`Session`]: per-connection reassembly engine, dispatcher, lifecycle
//! - [`Server`]: TCP accept loop driving one session per connection
//!
//! ## Example
//!
//! ```ignore
//! use spdyframe::Server;
//!
//! #[tokio::main]
//! async fn main() -> spdyframe::Result<()> {
//!     Server::bind(8443).await?.run().await
//! }
//! ```

pub mod protocol;

mod channel;
mod error;
mod server;
mod session;

pub use channel::BufferedChannel;
pub use error::{Result, SpdyError};
pub use server::Server;
pub use session::{IoEvent, Session, SessionConfig, SessionState};
