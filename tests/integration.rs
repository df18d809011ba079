//! End-to-end tests over a real TCP connection.
//!
//! These exercise the accept loop, the watermark-driven read path, and the
//! reject-all stream admission policy from a peer's point of view.

use spdyframe::protocol::{
    ControlType, FrameHeader, FrameKind, RstStream, StatusCode, SynStream, HEADER_SIZE,
    PROTOCOL_VERSION,
};
use spdyframe::{Server, SessionConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};

/// A SYN_STREAM frame carrying only the fixed body.
fn syn_stream_frame(stream_id: u32) -> Vec<u8> {
    let header = FrameHeader::control(ControlType::SynStream, 0, SynStream::SIZE as u32);
    let mut buf = vec![0u8; HEADER_SIZE + SynStream::SIZE];
    header.marshal(&mut buf).unwrap();
    buf[HEADER_SIZE..HEADER_SIZE + 4].copy_from_slice(&stream_id.to_be_bytes());
    buf
}

fn expected_refusal(stream_id: u32) -> Vec<u8> {
    let mut buf = vec![0u8; HEADER_SIZE + RstStream::SIZE];
    let n = FrameHeader::control(ControlType::RstStream, 0, RstStream::SIZE as u32)
        .marshal(&mut buf)
        .unwrap();
    RstStream {
        stream_id,
        status: StatusCode::RefusedStream,
    }
    .marshal(&mut buf[n..])
    .unwrap();
    buf
}

fn control_frame(frame_type: u16, payload: &[u8]) -> Vec<u8> {
    let header = FrameHeader {
        kind: FrameKind::Control {
            version: PROTOCOL_VERSION,
            frame_type,
        },
        flags: 0,
        length: payload.len() as u32,
    };
    let mut buf = vec![0u8; HEADER_SIZE];
    header.marshal(&mut buf).unwrap();
    buf.extend_from_slice(payload);
    buf
}

/// Start a server on an ephemeral port and return a connected client.
async fn connect(config: SessionConfig) -> TcpStream {
    let server = Server::bind_with_config(0, config).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    TcpStream::connect(addr).await.unwrap()
}

#[tokio::test]
async fn syn_stream_is_refused_on_the_wire() {
    let mut client = connect(SessionConfig::default()).await;

    client.write_all(&syn_stream_frame(1)).await.unwrap();

    let mut reply = vec![0u8; HEADER_SIZE + RstStream::SIZE];
    timeout(Duration::from_secs(5), client.read_exact(&mut reply))
        .await
        .expect("timed out waiting for RST_STREAM")
        .unwrap();

    assert_eq!(reply, expected_refusal(1));
}

#[tokio::test]
async fn fragmented_syn_stream_is_still_refused() {
    let mut client = connect(SessionConfig::default()).await;

    // Dribble the frame one byte at a time across separate writes.
    let frame = syn_stream_frame(7);
    for byte in &frame {
        client.write_all(std::slice::from_ref(byte)).await.unwrap();
        client.flush().await.unwrap();
    }

    let mut reply = vec![0u8; HEADER_SIZE + RstStream::SIZE];
    timeout(Duration::from_secs(5), client.read_exact(&mut reply))
        .await
        .expect("timed out waiting for RST_STREAM")
        .unwrap();

    assert_eq!(reply, expected_refusal(7));
}

#[tokio::test]
async fn unknown_control_frame_is_tolerated() {
    let mut client = connect(SessionConfig::default()).await;

    // An unrecognized control type must be skipped, not kill the session;
    // the SYN_STREAM behind it still gets refused.
    let mut bytes = control_frame(0x0077, b"mystery");
    bytes.extend_from_slice(&syn_stream_frame(9));
    client.write_all(&bytes).await.unwrap();

    let mut reply = vec![0u8; HEADER_SIZE + RstStream::SIZE];
    timeout(Duration::from_secs(5), client.read_exact(&mut reply))
        .await
        .expect("timed out waiting for RST_STREAM")
        .unwrap();

    assert_eq!(reply, expected_refusal(9));
}

#[tokio::test]
async fn oversized_frame_closes_the_connection() {
    let mut client = connect(SessionConfig {
        max_frame_length: 256,
        ..SessionConfig::default()
    })
    .await;

    let header = FrameHeader::control(ControlType::SynStream, 0, 256);
    let mut bytes = vec![0u8; HEADER_SIZE];
    header.marshal(&mut bytes).unwrap();
    client.write_all(&bytes).await.unwrap();

    // The server tears the session down without replying; the client sees
    // EOF (or a reset, depending on timing).
    let mut buf = [0u8; 1];
    let result = timeout(Duration::from_secs(5), client.read(&mut buf))
        .await
        .expect("timed out waiting for close");
    match result {
        Ok(n) => assert_eq!(n, 0, "expected EOF, got data"),
        Err(_) => {} // connection reset also counts as closed
    }
}

#[tokio::test]
async fn client_eof_tears_down_quietly() {
    let client = connect(SessionConfig::default()).await;
    drop(client);
    // Nothing to assert beyond "the server task doesn't wedge"; give the
    // driver a moment to observe the EOF.
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn many_syn_streams_each_get_their_own_reset() {
    let mut client = connect(SessionConfig::default()).await;

    let ids = [1u32, 3, 5, 7, 9];
    let mut bytes = Vec::new();
    for &id in &ids {
        bytes.extend_from_slice(&syn_stream_frame(id));
    }
    client.write_all(&bytes).await.unwrap();

    let mut expected = Vec::new();
    for &id in &ids {
        expected.extend_from_slice(&expected_refusal(id));
    }

    let mut reply = vec![0u8; expected.len()];
    timeout(Duration::from_secs(5), client.read_exact(&mut reply))
        .await
        .expect("timed out waiting for resets")
        .unwrap();
    assert_eq!(reply, expected);
}
