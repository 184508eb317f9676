#![forbid(unsafe_code)]
//! Network node for Forgechain: serves the REST API and joins the peer network.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use forgechain::api;
use forgechain::config::load_config;
use forgechain::consensus::HttpPeerClient;
use forgechain::ledger::Ledger;
use forgechain::node::Node;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Port to listen on (overrides the configuration file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind to (overrides the configuration file)
    #[arg(long)]
    bind: Option<String>,

    /// Additional bootstrap peer as host:port (repeatable)
    #[arg(long = "peer")]
    peers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    let config = load_config(&cli.config)?;
    let bind_address = cli.bind.unwrap_or(config.network.bind_address);
    let port = cli.port.unwrap_or(config.network.port);

    let peer_client = Arc::new(HttpPeerClient::with_timeout(Duration::from_secs(
        config.node.peer_timeout_secs,
    ))?);
    let node = match config.node.identifier {
        Some(identifier) => Node::with_node_id(Ledger::new()?, peer_client, identifier),
        None => Node::with_parts(Ledger::new()?, peer_client),
    };
    let node = Arc::new(node);
    info!(node_id = %node.node_id(), "Starting forgechain node");

    for peer in config.network.bootstrap_peers.iter().chain(cli.peers.iter()) {
        match node.peers.register(peer) {
            Ok(address) => info!(peer = %address, "Registered bootstrap peer"),
            Err(e) => warn!(peer = %peer, error = %e, "Skipping invalid bootstrap peer"),
        }
    }

    tokio::select! {
        result = api::serve(node.clone(), &bind_address, port) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            node.stop_mining();
        }
    }

    Ok(())
}
