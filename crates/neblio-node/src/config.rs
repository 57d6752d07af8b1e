//! Node configuration.

use crate::Args;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node name.
    pub node_name: String,
    /// Network tag (main, test, signet, regtest).
    pub network: String,
    /// Data directory.
    pub data_dir: PathBuf,
    /// Orphan-block pool capacity.
    #[serde(default = "default_max_orphan_blocks")]
    pub max_orphan_blocks: usize,
    /// Network configuration.
    #[serde(default)]
    pub network_config: NetworkConfig,
}

fn default_max_orphan_blocks() -> usize {
    64
}

/// P2P configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// P2P bind address; the port defaults to the network's.
    pub bind_address: String,
    /// Known peers.
    pub known_peers: Vec<String>,
    /// Maximum connections.
    pub max_connections: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            known_peers: Vec::new(),
            max_connections: 30,
        }
    }
}

impl NodeConfig {
    /// Load configuration from file, then apply CLI overrides.
    pub fn load(config_path: &Path, args: &Args) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content =
                std::fs::read_to_string(config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Self::default_for_network(&args.network)
        };

        config.network = args.network.clone();
        if let Some(ref data_dir) = args.data_dir {
            config.data_dir = data_dir.clone();
        }
        Ok(config)
    }

    /// Create default config for a network.
    pub fn default_for_network(network: &str) -> Self {
        let data_dir = match network {
            "main" => PathBuf::from(".neblio"),
            tag => PathBuf::from(format!(".neblio-{tag}")),
        };
        Self {
            node_name: "neblio-node".to_string(),
            network: network.to_string(),
            data_dir,
            max_orphan_blocks: default_max_orphan_blocks(),
            network_config: NetworkConfig::default(),
        }
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
