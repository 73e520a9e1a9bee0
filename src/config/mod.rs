//! Persisted settings of the publisher

mod error;
mod xdg;

pub use error::ConfigError;
pub use xdg::{config_path, xdg_config_home};

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::{File, OpenOptions},
    path::Path,
};
use tracing::{debug, info};
use url::Url;

use crate::ipfs::parse_ipfs_urls;

/// Default IPFS API
pub const DEFAULT_IPFS_API: &str = "https://api.ipfs.dappnode.io/";
/// Default IPFS gateway, used to read release manifests
pub const DEFAULT_IPFS_GATEWAY: &str = "https://gateway-dev.ipfs.dappnode.io";
/// ENS registry on Ethereum mainnet
pub const MAINNET_ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

/// Permission managers (Aragon ACL contracts) of the two legacy registries.
///
/// Both are left unset until configured.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct AclConfig {
    /// ACL of `dnp.dappnode.eth`
    pub dnp: Option<Address>,
    /// ACL of `public.dappnode.eth`
    pub public: Option<Address>,
}

/// Represents the contents of the configuration file in a user's .config
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct GlobalConfig {
    /// Version of the crate that wrote the file
    version: String,
    /// IPFS APIs releases are written to, the first one being the primary
    pub ipfs_api_urls: Vec<String>,
    /// HTTP gateway used to read manifests
    pub ipfs_gateway_url: String,
    /// Ethereum JSON-RPC endpoint used for name resolution, contract reads and
    /// transaction submission
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// ENS registry contract
    pub ens_registry: Address,
    /// DPM registries by name, as EIP-3770 addresses (`xdai:0x…`)
    #[serde(default)]
    pub dpm_registries: BTreeMap<String, String>,
    /// Legacy permission managers
    #[serde(default)]
    pub acl: AclConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            ipfs_api_urls: vec![DEFAULT_IPFS_API.to_string()],
            ipfs_gateway_url: DEFAULT_IPFS_GATEWAY.to_string(),
            rpc_url: None,
            ens_registry: MAINNET_ENS_REGISTRY,
            dpm_registries: BTreeMap::new(),
            acl: AclConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Version of the crate that wrote this config
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The configured JSON-RPC endpoint
    pub fn rpc_url(&self) -> Result<&str, ConfigError> {
        self.rpc_url
            .as_deref()
            .ok_or(ConfigError::Missing("rpc_url"))
    }

    /// Replace the IPFS API list with a comma or whitespace separated list of URLs
    pub fn set_ipfs_api_urls(&mut self, urls: &str) -> Result<(), ConfigError> {
        let urls = parse_ipfs_urls(urls);
        if urls.is_empty() {
            return Err(ConfigError::Invalid {
                field: "ipfs_api_urls",
                reason: "at least one URL is required".to_string(),
            });
        }
        for url in &urls {
            Url::parse(url).map_err(|err| ConfigError::Invalid {
                field: "ipfs_api_urls",
                reason: format!("{url}: {err}"),
            })?;
        }
        self.ipfs_api_urls = urls;
        Ok(())
    }

    /// Set the JSON-RPC endpoint
    pub fn set_rpc_url(&mut self, url: &str) -> Result<(), ConfigError> {
        Url::parse(url).map_err(|err| ConfigError::Invalid {
            field: "rpc_url",
            reason: err.to_string(),
        })?;
        self.rpc_url = Some(url.to_string());
        Ok(())
    }

    /// Read from a specific file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|err| ConfigError::io(path, err))?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Write to a specific file
    pub fn to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let writer = OpenOptions::new()
            .create(true)
            .append(false)
            .truncate(true)
            .write(true)
            .open(path)
            .map_err(|err| ConfigError::io(path, err))?;
        serde_json::to_writer_pretty(writer, &self)?;
        Ok(())
    }

    /// Write to disk
    pub fn to_disk(&self) -> Result<(), ConfigError> {
        self.to_path(&config_path()?)
    }

    /// Initialize from file on disk, creating a default one when missing
    pub fn from_disk() -> Result<Self, ConfigError> {
        let path = config_path()?;
        if path.exists() {
            debug!("loading config from {}", path.display());
            Self::from_path(&path)
        } else {
            let config = Self::default();
            config.to_path(&path)?;
            info!("created default config at {}", path.display());
            Ok(config)
        }
    }
}
