use std::fs;
use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use serde::Deserialize;

use crate::client::MulticallMode;
use crate::domain::chain::ChainId;
use crate::error::{Error, Result};
use crate::infrastructure::ethereum::ProviderConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: Option<String>,
    pub rpc: Option<String>,
    pub ws: Option<String>,
    pub ipc: Option<String>,
    /// Multicall3-compatible aggregator address
    pub multicall: Option<String>,
    /// Calls per aggregated request; 0 disables aggregation
    pub multicall_batch_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignerConfig {
    /// Environment variable holding the hex private key
    pub private_key_env: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chains: Vec<ChainConfig>,

    pub signer: Option<SignerConfig>,
}

impl ChainConfig {
    pub fn new(chain_id: u64, rpc: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: None,
            rpc: Some(rpc.into()),
            ws: None,
            ipc: None,
            multicall: None,
            multicall_batch_size: None,
        }
    }

    pub fn chain_id(&self) -> ChainId {
        ChainId(self.chain_id)
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("chain-{}", self.chain_id))
    }

    /// Transport for this chain; IPC wins over WebSocket wins over HTTP
    pub fn provider_config(&self) -> Result<ProviderConfig> {
        if let Some(ipc) = non_empty(&self.ipc) {
            #[cfg(unix)]
            {
                return Ok(ProviderConfig::Ipc(PathBuf::from(ipc)));
            }
            #[cfg(not(unix))]
            {
                return Err(Error::Config(format!(
                    "chain {}: IPC is not supported on this platform ({})",
                    self.chain_id, ipc
                )));
            }
        }
        if let Some(ws) = non_empty(&self.ws) {
            return Ok(ProviderConfig::WebSocket(ws.to_string()));
        }
        if let Some(rpc) = non_empty(&self.rpc) {
            return Ok(ProviderConfig::Http(normalize_http_endpoint(rpc)));
        }
        Err(Error::Config(format!(
            "chain {} has no rpc, ws or ipc endpoint",
            self.chain_id
        )))
    }

    pub fn multicall_address(&self) -> Result<Option<Address>> {
        non_empty(&self.multicall)
            .map(|raw| {
                raw.parse::<Address>().map_err(|err| {
                    Error::Config(format!(
                        "chain {}: invalid multicall address '{}': {}",
                        self.chain_id, raw, err
                    ))
                })
            })
            .transpose()
    }

    pub fn multicall_mode(&self) -> MulticallMode {
        MulticallMode::from_batch_size(self.multicall_batch_size)
    }
}

impl Config {
    /// Parse a TOML document
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| Error::Config(err.to_string()))
    }

    pub fn chain(&self, chain_id: ChainId) -> Option<&ChainConfig> {
        self.chains.iter().find(|chain| chain.chain_id() == chain_id)
    }
}

/// Load the config from the default location
///
/// A missing file yields the default (empty) config.
pub fn load() -> Result<Config> {
    match config_path() {
        Some(path) if path.exists() => load_from(&path),
        _ => Ok(Config::default()),
    }
}

pub fn load_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .map_err(|err| Error::Config(format!("{}: {}", path.display(), err)))?;
    Config::parse(&content).map_err(|err| Error::Config(format!("{}: {}", path.display(), err)))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("OMNICALL_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("omnicall").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("omnicall").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "omnicall", "omnicall")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn normalize_http_endpoint(value: &str) -> String {
    if value.contains("://") {
        value.to_string()
    } else {
        format!("http://{}", value)
    }
}
