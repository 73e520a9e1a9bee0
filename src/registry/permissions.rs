use alloy_primitives::{b256, Address, B256};
use tracing::{debug, info};

use super::{
    abi::{ApmRepo, DpmRegistry, DpmRepo},
    eip3770::{parse_eip3770_address, Eip3770Address},
    names::{format_semantic_version, parse_dpm_dnp_name},
    RegistryError, RepoAddresses,
};
use crate::{chain::JsonRpcClient, config::GlobalConfig};

/// Role checked on legacy repos and managed through the ACL
pub const APM_CREATE_VERSION_ROLE: B256 =
    b256!("0000000000000000000000000000000000000000000000000000000000000001");

/// What a DPM registry knows about a package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DpmStatus {
    /// Published, new versions go to the repo
    RepoExists {
        /// The package's repo
        repo_address: Address,
    },
    /// Not published yet, the registry creates it
    NewPackage {
        /// The registry
        registry_address: Address,
    },
}

impl DpmStatus {
    /// The addresses to build a publish transaction with
    pub fn addresses(&self) -> RepoAddresses {
        match *self {
            DpmStatus::RepoExists { repo_address } => RepoAddresses {
                registry_address: None,
                repo_address: Some(repo_address),
            },
            DpmStatus::NewPackage { registry_address } => RepoAddresses {
                registry_address: Some(registry_address),
                repo_address: None,
            },
        }
    }
}

/// The configured EIP-3770 address of the DPM registry a package belongs to
pub fn dpm_registry_address(
    dnp_name: &str,
    config: &GlobalConfig,
) -> Result<Eip3770Address, RegistryError> {
    let (_, registry_name) = parse_dpm_dnp_name(dnp_name)?;
    let address = config
        .dpm_registries
        .get(registry_name)
        .ok_or_else(|| RegistryError::UnknownRegistry(registry_name.to_string()))?;
    parse_eip3770_address(address)
}

/// Repo of `repo_name` in a DPM registry, `None` when it was never published
pub async fn resolve_dpm_package(
    client: &JsonRpcClient,
    registry: Address,
    repo_name: &str,
) -> Result<Option<Address>, RegistryError> {
    let call = DpmRegistry::getPackageCall {
        name: repo_name.to_string(),
    };
    match client.call_contract(registry, call).await {
        Ok(package) if !package.repo.is_zero() => Ok(Some(package.repo)),
        Ok(_) => Ok(None),
        Err(err) if err.is_revert() => {
            debug!("getPackage({repo_name}) reverted: {err}");
            Ok(None)
        }
        Err(err) => Err(RegistryError::Chain {
            context: format!("Error getting package {repo_name}"),
            source: err,
        }),
    }
}

/// Check that the registry at `registry` is `registry_name` and that `user` may
/// publish `repo_name` to it: `ADD_PACKAGE_ROLE` on the registry for a new package,
/// `CREATE_VERSION_ROLE` on the repo otherwise.
pub async fn check_dpm_permissions(
    client: &JsonRpcClient,
    registry_name: &str,
    registry: Address,
    repo_name: &str,
    user: Address,
) -> Result<DpmStatus, RegistryError> {
    let actual_name = client
        .call_contract(registry, DpmRegistry::registryNameCall {})
        .await
        .map_err(RegistryError::chain(format!("Registry {registry} not found")))?
        ._0;
    if actual_name != registry_name {
        return Err(RegistryError::Validation(format!(
            "Registry at address {registry} has registryName {actual_name} instead of expected {registry_name}"
        )));
    }

    match resolve_dpm_package(client, registry, repo_name).await? {
        None => {
            let role = client
                .call_contract(registry, DpmRegistry::ADD_PACKAGE_ROLECall {})
                .await
                .map_err(RegistryError::chain("Error reading ADD_PACKAGE_ROLE"))?
                ._0;
            let allowed = client
                .call_contract(registry, DpmRegistry::hasRoleCall { role, account: user })
                .await
                .map_err(RegistryError::chain("Error calling hasRole"))?
                ._0;
            if !allowed {
                return Err(RegistryError::Permission(format!(
                    "Address {user} not allowed to publish to registry {registry_name}"
                )));
            }
            Ok(DpmStatus::NewPackage {
                registry_address: registry,
            })
        }
        Some(repo) => {
            let role = client
                .call_contract(repo, DpmRepo::CREATE_VERSION_ROLECall {})
                .await
                .map_err(RegistryError::chain("Error reading CREATE_VERSION_ROLE"))?
                ._0;
            let allowed = client
                .call_contract(repo, DpmRepo::hasRoleCall { role, account: user })
                .await
                .map_err(RegistryError::chain("Error calling hasRole"))?
                ._0;
            if !allowed {
                return Err(RegistryError::Permission(format!(
                    "Address {user} not allowed to publish to repo {repo_name}"
                )));
            }
            Ok(DpmStatus::RepoExists { repo_address: repo })
        }
    }
}

/// Whether `user` may push versions to the legacy repo at `repo`
pub async fn apm_repo_is_allowed(
    client: &JsonRpcClient,
    repo: Address,
    user: Address,
) -> Result<bool, RegistryError> {
    let call = ApmRepo::canPerformCall {
        who: user,
        what: APM_CREATE_VERSION_ROLE,
        how: Vec::new(),
    };
    Ok(client
        .call_contract(repo, call)
        .await
        .map_err(RegistryError::chain(format!("Error calling canPerform({user})")))?
        ._0)
}

/// Fail with a permission error before a transaction is attempted if `user` cannot
/// publish to an existing legacy repo. New repos are checked by the registry itself.
pub async fn ensure_can_publish(
    client: &JsonRpcClient,
    dnp_name: &str,
    addresses: &RepoAddresses,
    user: Address,
) -> Result<(), RegistryError> {
    let Some(repo) = addresses.repo_address else {
        return Ok(());
    };
    if apm_repo_is_allowed(client, repo, user).await? {
        info!("{user} may publish {dnp_name}");
        Ok(())
    } else {
        Err(RegistryError::Permission(format!(
            "Address {user} is not allowed to publish new versions of {dnp_name}"
        )))
    }
}

/// Latest published version of a legacy repo, as `x.y.z`
pub async fn latest_version(client: &JsonRpcClient, repo: Address) -> Result<String, RegistryError> {
    let latest = client
        .call_contract(repo, ApmRepo::getLatestCall {})
        .await
        .map_err(RegistryError::chain(format!(
            "Error getting latest version of {repo}"
        )))?;
    Ok(format_semantic_version(&latest.semanticVersion))
}
