use alloy_primitives::Address;
use async_trait::async_trait;
use clap::Subcommand;
use colored::Colorize;
use url::Url;

use super::RunnableCommand;
use crate::{
    cli::CliError,
    config::{ConfigError, GlobalConfig},
    registry::{parse_address, parse_eip3770_address},
};

/// Subcommand for settings
#[derive(Subcommand, Clone, Debug)]
pub enum ConfigCommand {
    /// Print the current settings
    Show,
    /// Replace the IPFS API list, comma separated, primary first
    SetIpfs {
        /// API URLs
        urls: String,
    },
    /// Set the gateway manifests are read from
    SetGateway {
        /// Gateway URL
        url: String,
    },
    /// Set the JSON-RPC endpoint
    SetRpc {
        /// Endpoint URL
        url: String,
    },
    /// Register a DPM registry
    AddRegistry {
        /// Registry name, e.g. dnp.dappnode.eth
        name: String,
        /// EIP-3770 address, e.g. xdai:0x01c5…
        address: String,
    },
    /// Set the ACL contracts that manage publishing rights
    SetAcl {
        /// ACL of dnp.dappnode.eth packages
        #[arg(long)]
        dnp: Option<String>,
        /// ACL of public.dappnode.eth packages
        #[arg(long)]
        public: Option<String>,
    },
}

#[async_trait(?Send)]
impl RunnableCommand<CliError> for ConfigCommand {
    async fn run_internal(self) -> Result<String, CliError> {
        let mut global = GlobalConfig::from_disk()?;
        let message = match self {
            ConfigCommand::Show => return Ok(serde_json::to_string_pretty(&global)?),
            ConfigCommand::SetIpfs { urls } => {
                global.set_ipfs_api_urls(&urls)?;
                format!("IPFS APIs: {}", global.ipfs_api_urls.join(", "))
            }
            ConfigCommand::SetGateway { url } => {
                Url::parse(&url).map_err(|err| ConfigError::Invalid {
                    field: "ipfs_gateway_url",
                    reason: err.to_string(),
                })?;
                global.ipfs_gateway_url = url;
                format!("IPFS gateway: {}", global.ipfs_gateway_url)
            }
            ConfigCommand::SetRpc { url } => {
                global.set_rpc_url(&url)?;
                format!("JSON-RPC endpoint: {url}")
            }
            ConfigCommand::AddRegistry { name, address } => {
                let parsed = parse_eip3770_address(&address)?;
                parsed.to_address()?;
                let message = format!("DPM registry {name}: {parsed}");
                global.dpm_registries.insert(name, address);
                message
            }
            ConfigCommand::SetAcl { dnp, public } => {
                if dnp.is_none() && public.is_none() {
                    return Err(ConfigError::Invalid {
                        field: "acl",
                        reason: "pass --dnp and/or --public".to_string(),
                    }
                    .into());
                }
                if let Some(dnp) = dnp {
                    global.acl.dnp = Some(parse_address(&dnp)?);
                }
                if let Some(public) = public {
                    global.acl.public = Some(parse_address(&public)?);
                }
                format!(
                    "ACL: dnp {}, public {}",
                    describe(global.acl.dnp),
                    describe(global.acl.public)
                )
            }
        };
        global.to_disk()?;
        Ok(format!("{}\n{}", "<< CONFIGURATION SAVED >>".green(), message))
    }
}

fn describe(address: Option<Address>) -> String {
    address.map_or_else(|| "unset".to_string(), |address| address.to_string())
}
