//! Parley Node - two-transport chat relay.
//!
//! This is the main entry point for running a relay node.

use clap::Parser;
use parley_bus::EventBus;
use parley_history::HistoryStore;
use parley_node::config::Config;
use parley_node::tcp_api::TcpFrontEnd;
use parley_node::ws_api::{self, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parley Node - real-time chat relay across TCP and WebSocket
#[derive(Parser, Debug)]
#[command(name = "parley-node")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// TCP listen address
    #[arg(long)]
    tcp_addr: Option<SocketAddr>,

    /// WebSocket listen address
    #[arg(long)]
    ws_addr: Option<SocketAddr>,

    /// History buffer capacity
    #[arg(long)]
    chat_log_size: Option<usize>,

    /// Delay before history replay, in milliseconds
    #[arg(long)]
    replay_delay_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(addr) = args.tcp_addr {
        config.tcp_addr = addr;
    }
    if let Some(addr) = args.ws_addr {
        config.ws_addr = addr;
    }
    if let Some(size) = args.chat_log_size {
        config.chat_log_size = size;
    }
    if let Some(delay) = args.replay_delay_ms {
        config.replay_delay_ms = delay;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("parley={}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Parley node");
    tracing::info!(
        tcp_addr = %config.tcp_addr,
        ws_addr = %config.ws_addr,
        chat_log_size = config.chat_log_size,
        replay_delay_ms = config.replay_delay_ms,
        "Node configuration"
    );

    let (bus, queries) = EventBus::new();
    tokio::spawn(HistoryStore::new(config.chat_log_size).run(bus.clone(), queries));

    let tcp = TcpFrontEnd::bind(config.tcp_addr, bus.clone(), config.replay_delay()).await?;
    let ws_listener = tokio::net::TcpListener::bind(config.ws_addr).await?;
    let ws_state = AppState::new(bus.clone(), config.replay_delay());

    tokio::select! {
        result = tcp.serve() => result?,
        result = ws_api::serve(ws_listener, ws_state) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}
