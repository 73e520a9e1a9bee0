use alloy_primitives::{keccak256, Address, B256};
use tracing::debug;

use super::{
    abi::{EnsPublicResolver, EnsRegistry},
    names::parse_dpm_dnp_name,
    RegistryError, RepoAddresses,
};
use crate::chain::JsonRpcClient;

/// ENS namehash (EIP-137)
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        let mut buffer = [0u8; 64];
        buffer[..32].copy_from_slice(node.as_slice());
        buffer[32..].copy_from_slice(label_hash.as_slice());
        node = keccak256(buffer);
    }
    node
}

/// Resolves ENS names to addresses through an ENS registry
#[derive(Debug, Clone)]
pub struct EnsResolver {
    client: JsonRpcClient,
    registry: Address,
}

impl EnsResolver {
    /// Resolve through the ENS registry at `registry`
    pub fn new(client: JsonRpcClient, registry: Address) -> Self {
        Self { client, registry }
    }

    /// The underlying RPC client
    pub fn client(&self) -> &JsonRpcClient {
        &self.client
    }

    /// Address of `name`. A name without resolver or address is not an error: it
    /// resolves to `None`.
    pub async fn resolve(&self, name: &str) -> Result<Option<Address>, RegistryError> {
        let name = name.trim().to_lowercase();
        if name.is_empty() || name.split('.').any(str::is_empty) {
            return Err(RegistryError::InvalidName(name));
        }
        let node = namehash(&name);

        let resolver = self
            .client
            .call_contract(self.registry, EnsRegistry::resolverCall { node })
            .await
            .map_err(RegistryError::chain(format!("Error resolving {name}")))?
            ._0;
        if resolver.is_zero() {
            debug!("{name} has no resolver");
            return Ok(None);
        }

        let address = self
            .client
            .call_contract(resolver, EnsPublicResolver::addrCall { node })
            .await
            .map_err(RegistryError::chain(format!("Error resolving {name}")))?
            ._0;
        if address.is_zero() {
            debug!("{name} has no address");
            Ok(None)
        } else {
            Ok(Some(address))
        }
    }
}

/// Resolve a package name and its registry concurrently.
///
/// `geth.dnp.dappnode.eth` resolves `dnp.dappnode.eth` as the registry and the full
/// name as the repository; either can be absent.
pub async fn resolve_dnp_name(
    resolver: &EnsResolver,
    dnp_name: &str,
) -> Result<RepoAddresses, RegistryError> {
    let (_, registry_name) = parse_dpm_dnp_name(dnp_name)?;
    let (registry_address, repo_address) =
        tokio::try_join!(resolver.resolve(registry_name), resolver.resolve(dnp_name))?;
    Ok(RepoAddresses {
        registry_address,
        repo_address,
    })
}
