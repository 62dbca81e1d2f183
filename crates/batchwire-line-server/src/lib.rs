//! # Batchwire Line Server
//!
//! Serves a [`JsonRpcEngine`] over TCP with one request text per
//! newline-terminated line. Each line is handed to the engine unchanged and the
//! rendered response, if any, is written back as a single line.
//!
//! ```rust,no_run
//! use batchwire_line_server::{LineServer, LineServerConfig, demo::demo_registry};
//! use batchwire_json_rpc::JsonRpcEngine;
//!
//! # async fn run() -> Result<(), batchwire_line_server::LineServerError> {
//! let engine = JsonRpcEngine::new(demo_registry());
//! let server = LineServer::bind(LineServerConfig::default(), engine).await?;
//! server.run().await
//! # }
//! ```

pub mod demo;

use std::net::SocketAddr;

use batchwire_json_rpc::JsonRpcEngine;
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

/// Default listen address
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:9999";

/// Default upper bound for one request line (1 MiB)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum LineServerError {
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to accept connection: {0}")]
    Accept(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Framing error: {0}")]
    Codec(#[from] LinesCodecError),
}

/// Listener settings
#[derive(Debug, Clone)]
pub struct LineServerConfig {
    pub bind_address: SocketAddr,
    /// Lines longer than this close the connection
    pub max_line_length: usize,
}

impl Default for LineServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 9999)),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// A bound TCP listener serving one engine
pub struct LineServer {
    listener: TcpListener,
    engine: JsonRpcEngine,
    config: LineServerConfig,
}

impl LineServer {
    pub async fn bind(
        config: LineServerConfig,
        engine: JsonRpcEngine,
    ) -> Result<Self, LineServerError> {
        let listener = TcpListener::bind(config.bind_address)
            .await
            .map_err(|source| LineServerError::Bind {
                address: config.bind_address,
                source,
            })?;
        Ok(Self {
            listener,
            engine,
            config,
        })
    }

    /// The address actually bound, useful when binding port 0
    pub fn local_addr(&self) -> Result<SocketAddr, LineServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one task per connection.
    ///
    /// Only an accept failure ends the loop; connection errors are logged.
    pub async fn run(self) -> Result<(), LineServerError> {
        info!(address = %self.local_addr()?, "line server listening");

        loop {
            let (stream, peer) = self.listener.accept().await.map_err(LineServerError::Accept)?;
            debug!(peer = %peer, "connection accepted");

            let engine = self.engine.clone();
            let max_line_length = self.config.max_line_length;
            tokio::spawn(async move {
                match serve_connection_with_limit(stream, &engine, max_line_length).await {
                    Ok(()) => debug!(peer = %peer, "connection closed"),
                    Err(e) => warn!(peer = %peer, error = %e, "connection ended with an error"),
                }
            });
        }
    }
}

/// Serve one connection with the default line limit until the peer closes it
pub async fn serve_connection<S>(stream: S, engine: &JsonRpcEngine) -> Result<(), LineServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    serve_connection_with_limit(stream, engine, DEFAULT_MAX_LINE_LENGTH).await
}

/// Serve one connection, processing its lines strictly one after another
pub async fn serve_connection_with_limit<S>(
    stream: S,
    engine: &JsonRpcEngine,
    max_line_length: usize,
) -> Result<(), LineServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(max_line_length));

    while let Some(line) = framed.next().await {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        if let Some(response) = engine.process_request(&line).await {
            framed.send(response).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    #[test]
    fn test_default_config() {
        let config = LineServerConfig::default();
        assert_eq!(config.bind_address.to_string(), DEFAULT_BIND_ADDRESS);
        assert_eq!(config.max_line_length, 1_048_576);
    }

    #[tokio::test]
    async fn test_serve_connection_in_memory() {
        let engine = JsonRpcEngine::new(demo::demo_registry());
        let (mut client, server) = duplex(4096);

        let handle = tokio::spawn(async move { serve_connection(server, &engine).await });

        client
            .write_all(b"\n{\"jsonrpc\":\"2.0\",\"method\":\"echo\",\"params\":[1]}\n")
            .await
            .unwrap();
        client
            .write_all(b"{\"jsonrpc\":\"2.0\",\"method\":\"sum\",\"params\":[1,2],\"id\":1}\n")
            .await
            .unwrap();
        client.shutdown().await.unwrap();

        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();
        handle.await.unwrap().unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1);
        let response: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(response, json!({"jsonrpc": "2.0", "result": 3, "id": 1}));
    }

    #[tokio::test]
    async fn test_overlong_line_is_a_codec_error() {
        let engine = JsonRpcEngine::new(demo::demo_registry());
        let (mut client, server) = duplex(4096);

        let handle =
            tokio::spawn(async move { serve_connection_with_limit(server, &engine, 16).await });
        client.write_all(&[b'x'; 64]).await.unwrap();
        client.write_all(b"\n").await.unwrap();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(LineServerError::Codec(_))));
    }
}
