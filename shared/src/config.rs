use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Overrides `wallet.project_id` when set.
pub const PROJECT_ID_ENV: &str = "TASKS_PROJECT_ID";

pub const DEFAULT_PROJECT_ID: &str = "08e98e52e456055a2826f902cc6639af";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub name: String,
    pub chain_id: u64,
    pub rpc: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Network {
    pub fn morph_holesky() -> Self {
        Self {
            name: "Morph Holesky".to_string(),
            chain_id: 2810,
            rpc: "https://rpc-quicknode-holesky.morphl2.io".to_string(),
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "ETH".to_string()
}

fn default_networks() -> Vec<Network> {
    vec![Network::morph_holesky()]
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    #[serde(default = "default_project_id")]
    pub project_id: String,
    /// Where the connected account is remembered between runs.
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            session_file: default_session_file(),
        }
    }
}

fn default_project_id() -> String {
    DEFAULT_PROJECT_ID.to_string()
}

fn default_session_file() -> PathBuf {
    PathBuf::from("./wallet.json")
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    pub poll_interval_ms: u64,
    /// `1` keeps reads strictly sequential.
    pub concurrency: usize,
    pub retry_times: u32,
    pub retry_delay_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5_000,
            concurrency: 1,
            retry_times: 3,
            retry_delay_ms: 300,
            request_timeout_ms: 10_000,
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// Task contract address.
    pub contract: Address,
    /// The first entry is the active network.
    #[serde(default = "default_networks")]
    pub networks: Vec<Network>,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl AppConfig {
    pub fn new(contract: Address) -> Self {
        Self {
            contract,
            networks: default_networks(),
            wallet: WalletConfig::default(),
            sync: SyncConfig::default(),
        }
    }

    pub fn network(&self) -> Result<&Network, ConfigError> {
        self.networks.first().ok_or(ConfigError::NoNetwork)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wallet.project_id.trim().is_empty() {
            return Err(ConfigError::MissingProjectId);
        }
        let network = self.network()?;
        Url::parse(&network.rpc).map_err(|source| {
            ConfigError::InvalidRpcUrl {
                url: network.rpc.clone(),
                source,
            }
        })?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(project_id) = std::env::var(PROJECT_ID_ENV) {
            if !project_id.is_empty() {
                self.wallet.project_id = project_id;
            }
        }
    }
}

pub fn load_config_file<P>(config_file: P) -> Result<AppConfig, ConfigError>
where
    P: AsRef<Path>, {
    let path = config_file.as_ref();
    let file = File::open(path).map_err(|err| {
        match err.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound { path: path.display().to_string() },
            _ => ConfigError::Io(err),
        }
    })?;
    let mut config: AppConfig = serde_json::from_reader(file)?;
    config.apply_env();
    config.validate()?;
    Ok(config)
}
