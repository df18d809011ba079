//! TCP accept loop and per-connection session driver.
//!
//! The server owns the listening socket and spawns one task per accepted
//! connection. Each task uniquely owns its [`Session`] and the connection
//! handle; sessions share no mutable state, so concurrency is free.
//!
//! The driver honors the watermark contract: it keeps reading from the
//! socket until the session's input channel holds at least `watermark`
//! bytes, and only then delivers `DataReady`. After each engine run it
//! drains the output channel onto the wire and delivers `Flushed`.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::error::Result;
use crate::session::{IoEvent, Session, SessionConfig};

/// Listening endpoint that frames every accepted connection.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    config: SessionConfig,
}

impl Server {
    /// Bind to `port` on all interfaces with the default session config.
    pub async fn bind(port: u16) -> Result<Self> {
        Self::bind_with_config(port, SessionConfig::default()).await
    }

    /// Bind to `port` with an explicit session config.
    pub async fn bind_with_config(port: u16, config: SessionConfig) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        Ok(Self { listener, config })
    }

    /// The locally bound address (useful when binding port 0 in tests).
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, spawning a driver task per connection.
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            tracing::debug!(%peer, "setting up session on new connection");

            let config = self.config.clone();
            tokio::spawn(async move {
                if let Err(e) = drive_connection(stream, config).await {
                    tracing::debug!(%peer, "session ended: {e}");
                }
            });
        }
    }
}

/// Drive one session until EOF, transport error, or protocol violation.
async fn drive_connection(stream: TcpStream, config: SessionConfig) -> Result<()> {
    let mut session = Session::new(config.clone());
    let (mut reader, mut writer) = stream.into_split();
    let mut buf = vec![0u8; config.read_chunk_size];

    loop {
        // Fill the input channel up to the watermark before waking the
        // engine; the watermark is the engine's backpressure signal.
        while session.input_available() < session.read_watermark() {
            let nbytes = match reader.read(&mut buf).await {
                Ok(0) => {
                    let _ = session.handle(IoEvent::Eof);
                    session.close();
                    return Ok(());
                }
                Ok(n) => n,
                Err(e) => {
                    let _ = session.handle(IoEvent::TransportError);
                    session.close();
                    return Err(e.into());
                }
            };
            session.append_input(&buf[..nbytes]);
        }

        let engine_result = session.handle(IoEvent::DataReady);

        // Write out whatever the engine serialized, even when it also hit
        // a fatal error on a later frame in the same batch.
        if session.has_output() {
            let out = session.take_output();
            writer.write_all(&out).await?;
            writer.flush().await?;
            let _ = session.handle(IoEvent::Flushed);
        }

        if let Err(e) = engine_result {
            session.close();
            return Err(e);
        }
    }
}
