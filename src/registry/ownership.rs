use alloy_primitives::Address;
use alloy_sol_types::SolCall;

use super::{abi::Acl, permissions::APM_CREATE_VERSION_ROLE, RegistryError};
use crate::{
    chain::{JsonRpcClient, TransactionRequest},
    config::{AclConfig, ConfigError},
};

/// Suffix of packages governed by the `dnp` ACL, everything else uses `public`
const DNP_SUFFIX: &str = ".dnp.dappnode.eth";

/// The ACL contract that manages permissions of `dnp_name`
pub fn acl_address(dnp_name: &str, acl: &AclConfig) -> Result<Address, RegistryError> {
    let address = if dnp_name.contains(DNP_SUFFIX) {
        acl.dnp.ok_or(ConfigError::Missing("acl.dnp"))?
    } else {
        acl.public.ok_or(ConfigError::Missing("acl.public"))?
    };
    Ok(address)
}

/// Address allowed to grant and revoke publishing rights on `repo`
pub async fn permission_manager(
    client: &JsonRpcClient,
    acl: &AclConfig,
    dnp_name: &str,
    repo: Address,
) -> Result<Address, RegistryError> {
    let call = Acl::getPermissionManagerCall {
        app: repo,
        role: APM_CREATE_VERSION_ROLE,
    };
    Ok(client
        .call_contract(acl_address(dnp_name, acl)?, call)
        .await
        .map_err(RegistryError::chain(format!(
            "Error getting manager address for {dnp_name}"
        )))?
        ._0)
}

fn require<T: Copy>(value: Option<T>, field: &str) -> Result<T, RegistryError> {
    value.ok_or_else(|| RegistryError::Validation(format!("{field} must be defined")))
}

fn require_name(dnp_name: &str) -> Result<(), RegistryError> {
    if dnp_name.trim().is_empty() {
        Err(RegistryError::Validation("dnpName must be defined".to_string()))
    } else {
        Ok(())
    }
}

/// Transaction granting `developer` the right to publish new versions of `dnp_name`
pub fn build_grant_developer_tx(
    acl: &AclConfig,
    developer: Option<Address>,
    dnp_name: &str,
    repo: Option<Address>,
) -> Result<TransactionRequest, RegistryError> {
    let developer = require(developer, "developerAddress")?;
    require_name(dnp_name)?;
    let repo = require(repo, "repoAddress")?;

    let call = Acl::grantPermissionCall {
        entity: developer,
        app: repo,
        role: APM_CREATE_VERSION_ROLE,
    };
    Ok(TransactionRequest::new(
        acl_address(dnp_name, acl)?,
        call.abi_encode(),
    ))
}

/// Transaction handing the permission manager role of `dnp_name` to `new_manager`
pub fn build_set_manager_tx(
    acl: &AclConfig,
    new_manager: Option<Address>,
    dnp_name: &str,
    repo: Option<Address>,
) -> Result<TransactionRequest, RegistryError> {
    let new_manager = require(new_manager, "newManagerAddress")?;
    require_name(dnp_name)?;
    let repo = require(repo, "repoAddress")?;

    let call = Acl::setPermissionManagerCall {
        newManager: new_manager,
        app: repo,
        role: APM_CREATE_VERSION_ROLE,
    };
    Ok(TransactionRequest::new(
        acl_address(dnp_name, acl)?,
        call.abi_encode(),
    ))
}
