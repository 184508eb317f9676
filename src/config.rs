//! Configuration management for Forgechain

use crate::error::{ChainError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub node: NodeConfig,
}

#[derive(Debug, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Peers registered at startup, `host:port` or full URLs.
    #[serde(default)]
    pub bootstrap_peers: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            bind_address: default_bind_address(),
            port: default_port(),
            bootstrap_peers: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NodeConfig {
    /// Identity that collects mining rewards; random when absent.
    #[serde(default)]
    pub identifier: Option<String>,
    /// Timeout for each peer chain fetch during resolution.
    #[serde(default = "default_peer_timeout_secs")]
    pub peer_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            identifier: None,
            peer_timeout_secs: default_peer_timeout_secs(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_peer_timeout_secs() -> u64 {
    5
}

/// Load configuration from `path`, falling back to defaults when the
/// file is absent.
pub fn load_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path).unwrap_or_default();
    let config = parse_config(&text)?;
    validate_config(&config)?;
    Ok(config)
}

fn parse_config(text: &str) -> Result<Config> {
    if text.is_empty() {
        return Ok(Config {
            network: NetworkConfig::default(),
            node: NodeConfig::default(),
        });
    }
    toml::from_str(text).map_err(|e| ChainError::ConfigError(e.to_string()))
}

fn validate_config(config: &Config) -> Result<()> {
    if config.network.bind_address.is_empty() {
        return Err(ChainError::ConfigError(
            "network.bind_address must not be empty".to_string(),
        ));
    }
    if config.network.port == 0 {
        return Err(ChainError::ConfigError(
            "network.port must not be 0".to_string(),
        ));
    }
    if config.node.peer_timeout_secs == 0 {
        return Err(ChainError::ConfigError(
            "node.peer_timeout_secs must not be 0".to_string(),
        ));
    }
    if let Some(identifier) = &config.node.identifier {
        if identifier.trim().is_empty() {
            return Err(ChainError::ConfigError(
                "node.identifier must not be blank".to_string(),
            ));
        }
    }
    Ok(())
}
