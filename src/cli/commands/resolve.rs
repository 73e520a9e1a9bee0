use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::{
    chain::JsonRpcClient,
    cli::CliError,
    config::GlobalConfig,
    registry::{
        dpm_registry_address, latest_version, parse_dpm_dnp_name, resolve_dnp_name,
        resolve_dpm_package, EnsResolver, RegistryDialect, RepoAddresses,
    },
};

/// Where a package lives
#[derive(Debug, Clone, Copy)]
pub(super) struct PackageLocation {
    pub(super) dialect: RegistryDialect,
    pub(super) addresses: RepoAddresses,
}

/// Resolve `dnp_name` through ENS, or through its configured DPM registry
pub(super) async fn locate_package(
    global: &GlobalConfig,
    client: &JsonRpcClient,
    dnp_name: &str,
) -> Result<PackageLocation, CliError> {
    let (repo_name, registry_name) = parse_dpm_dnp_name(dnp_name)?;
    let dialect = RegistryDialect::for_registry(registry_name, global);
    debug!("{dnp_name} belongs to {dialect} registry {registry_name}");

    let addresses = match dialect {
        RegistryDialect::Legacy => {
            let resolver = EnsResolver::new(client.clone(), global.ens_registry);
            resolve_dnp_name(&resolver, dnp_name).await?
        }
        RegistryDialect::Dpm => {
            let registry = dpm_registry_address(dnp_name, global)?;
            if let Some(expected) = registry.numeric_chain_id() {
                let actual = client.chain_id().await?;
                if actual != expected {
                    warn!("registry {registry} is on chain {expected} but the JSON-RPC endpoint serves chain {actual}");
                }
            }
            let registry_address = registry.to_address()?;
            RepoAddresses {
                registry_address: Some(registry_address),
                repo_address: resolve_dpm_package(client, registry_address, repo_name).await?,
            }
        }
    };
    Ok(PackageLocation { dialect, addresses })
}

fn describe(address: Option<Address>) -> String {
    address.map_or_else(|| "not found".to_string(), |address| address.to_string())
}

pub(super) async fn resolve(global: &GlobalConfig, dnp_name: &str) -> Result<String, CliError> {
    let client = JsonRpcClient::new(global.rpc_url()?)?;
    let location = locate_package(global, &client, dnp_name).await?;
    let mut lines = vec![
        format!("dialect:\t{}", location.dialect),
        format!("registry:\t{}", describe(location.addresses.registry_address)),
        format!("repo:\t\t{}", describe(location.addresses.repo_address)),
    ];
    if let (RegistryDialect::Legacy, Some(repo)) = (location.dialect, location.addresses.repo_address) {
        lines.push(format!("latest:\t\t{}", latest_version(&client, repo).await?));
    }
    Ok(lines.join("\n"))
}
