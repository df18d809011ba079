//! Standalone framing server.
//!
//! Usage: `spdyframed PORT` where PORT is in (1, 65535].

use std::process::ExitCode;

use spdyframe::Server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: spdyframed PORT");
        return ExitCode::FAILURE;
    }

    let port = match args[1].parse::<u32>() {
        Ok(p) if p > 1 && p <= u32::from(u16::MAX) => p as u16,
        _ => {
            eprintln!("invalid port number: {}", args[1]);
            return ExitCode::FAILURE;
        }
    };

    let server = match Server::bind(port).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to bind port {port}: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(port, "listening");
    if let Err(e) = server.run().await {
        tracing::error!("server stopped: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
