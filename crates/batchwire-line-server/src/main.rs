//! # batchwire-serve
//!
//! Serves the demo procedures over newline-framed TCP.
//!
//! ```bash
//! cargo run --bin batchwire-serve -- --bind 127.0.0.1:9999
//! echo '{"jsonrpc":"2.0","method":"subtract","params":[42,23],"id":1}' | nc 127.0.0.1 9999
//! ```

use std::net::SocketAddr;

use anyhow::Result;
use batchwire_json_rpc::{JsonRpcEngine, NotificationMode};
use batchwire_line_server::{
    DEFAULT_BIND_ADDRESS, DEFAULT_MAX_LINE_LENGTH, LineServer, LineServerConfig, demo::demo_registry,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = DEFAULT_BIND_ADDRESS)]
    bind: SocketAddr,

    /// Longest accepted request line in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    max_line_length: usize,

    /// Run notifications before answering instead of in the background
    #[arg(long)]
    inline_notifications: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mode = if args.inline_notifications {
        NotificationMode::Inline
    } else {
        NotificationMode::Spawn
    };
    let registry = demo_registry();
    info!(methods = ?registry.method_names(), ?mode, "starting batchwire-serve");

    let engine = JsonRpcEngine::builder()
        .resolver(registry)
        .notification_mode(mode)
        .build()?;

    let config = LineServerConfig {
        bind_address: args.bind,
        max_line_length: args.max_line_length,
    };
    LineServer::bind(config, engine).await?.run().await?;
    Ok(())
}
