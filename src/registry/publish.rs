use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    abi::{ApmRegistry, ApmRepo, DpmRegistry, DpmRepo},
    dialect::{format_content_uri, RegistryDialect},
    names::{parse_dpm_dnp_name, parse_semantic_version, short_name},
    RegistryError,
};
use crate::{chain::TransactionRequest, cid::normalize_ipfs_path};

/// Flags of packages created by the publisher
pub const DEFAULT_DPM_FLAGS: u8 = 0b000;

/// One attempt at publishing a release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    /// Full package name, e.g. `foo.public.dappnode.eth`
    pub dnp_name: String,
    /// Semantic version of the release
    pub version: String,
    /// Signed release, as `/ipfs/<cid>` or a bare CID
    pub manifest_hash: String,
    /// Developer allowed to publish further versions, needed for new repos
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_address: Option<Address>,
}

/// Where a package lives on chain. A missing repo means it was never published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoAddresses {
    /// Registry the package belongs to
    pub registry_address: Option<Address>,
    /// The package's own repo
    pub repo_address: Option<Address>,
}

/// Encodes publish transactions for one registry dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishTxBuilder {
    dialect: RegistryDialect,
}

impl PublishTxBuilder {
    /// Builder for `dialect`
    pub fn new(dialect: RegistryDialect) -> Self {
        Self { dialect }
    }

    /// The dialect transactions are encoded for
    pub fn dialect(&self) -> RegistryDialect {
        self.dialect
    }

    /// Encode the transaction publishing `request`.
    ///
    /// An existing repo gets a new version; otherwise the registry is asked to
    /// create the repo together with its first version, which requires a developer
    /// address.
    pub fn build_publish_tx(
        &self,
        request: &PublishRequest,
        addresses: &RepoAddresses,
    ) -> Result<TransactionRequest, RegistryError> {
        validate(request)?;
        let tx = match self.dialect {
            RegistryDialect::Legacy => legacy_tx(request, addresses)?,
            RegistryDialect::Dpm => dpm_tx(request, addresses)?,
        };
        debug!(
            "{} publish of {}@{} targets {}",
            self.dialect, request.dnp_name, request.version, tx.to
        );
        Ok(tx)
    }
}

fn validate(request: &PublishRequest) -> Result<(), RegistryError> {
    for (field, value) in [
        ("dnpName", &request.dnp_name),
        ("version", &request.version),
        ("manifestHash", &request.manifest_hash),
    ] {
        if value.trim().is_empty() {
            return Err(RegistryError::Validation(format!("{field} must be defined")));
        }
    }
    Ok(())
}

fn require_developer(request: &PublishRequest) -> Result<Address, RegistryError> {
    request.developer_address.ok_or_else(|| {
        RegistryError::Validation("developerAddress must be defined for new repos".to_string())
    })
}

fn legacy_tx(
    request: &PublishRequest,
    addresses: &RepoAddresses,
) -> Result<TransactionRequest, RegistryError> {
    // The manifest hash string itself, as UTF-8 bytes
    let content_uri = Bytes::copy_from_slice(request.manifest_hash.as_bytes());
    let version = parse_semantic_version(&request.version)?;

    if let Some(repo) = addresses.repo_address {
        let call = ApmRepo::newVersionCall {
            newSemanticVersion: version,
            contractAddress: Address::ZERO,
            contentURI: content_uri,
        };
        return Ok(TransactionRequest::new(repo, call.abi_encode()));
    }

    let developer = require_developer(request)?;
    let registry = addresses.registry_address.ok_or_else(|| {
        RegistryError::Validation(format!("No registry found for {}", request.dnp_name))
    })?;
    let call = ApmRegistry::newRepoWithVersionCall {
        name: short_name(&request.dnp_name).to_string(),
        dev: developer,
        initialSemanticVersion: version,
        contractAddress: Address::ZERO,
        contentURI: content_uri,
    };
    Ok(TransactionRequest::new(registry, call.abi_encode()))
}

fn dpm_tx(
    request: &PublishRequest,
    addresses: &RepoAddresses,
) -> Result<TransactionRequest, RegistryError> {
    let content_uri = format_content_uri(
        normalize_ipfs_path(&request.manifest_hash),
        RegistryDialect::Dpm,
    );

    if let Some(repo) = addresses.repo_address {
        let call = DpmRepo::newVersionCall {
            version: request.version.clone(),
            contentURIs: vec![content_uri],
        };
        return Ok(TransactionRequest::new(repo, call.abi_encode()));
    }

    let (repo_name, registry_name) = parse_dpm_dnp_name(&request.dnp_name)?;
    let developer = require_developer(request)?;
    let registry = addresses
        .registry_address
        .ok_or_else(|| RegistryError::UnknownRegistry(registry_name.to_string()))?;
    let call = DpmRegistry::newPackageWithVersionCall {
        name: repo_name.to_string(),
        dev: developer,
        flags: DEFAULT_DPM_FLAGS,
        version: request.version.clone(),
        contentURIs: vec![content_uri],
    };
    Ok(TransactionRequest::new(registry, call.abi_encode()))
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::address;

    const REPO: Address = address!("ee66c4765696c922078e8670aa9e6d4f6ffcc455");
    const REGISTRY: Address = address!("266BFdb2124A68beB6769dC887BD655f78778923");
    const DEVELOPER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const HASH: &str = "/ipfs/QmRhdmquYoiMR5GB2dKqhLipMzdFUeyZ2eSVvTLDvndTvh";

    fn request() -> PublishRequest {
        PublishRequest {
            dnp_name: "foo.public.dappnode.eth".to_string(),
            version: "1.0.0".to_string(),
            manifest_hash: HASH.to_string(),
            developer_address: None,
        }
    }

    #[test]
    fn legacy_existing_repo() {
        let addresses = RepoAddresses {
            registry_address: Some(REGISTRY),
            repo_address: Some(REPO),
        };
        let tx = PublishTxBuilder::new(RegistryDialect::Legacy)
            .build_publish_tx(&request(), &addresses)
            .unwrap();
        assert_eq!(tx.to, REPO);

        let call = ApmRepo::newVersionCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(call.newSemanticVersion, [1, 0, 0]);
        assert_eq!(call.contractAddress, Address::ZERO);
        assert_eq!(call.contentURI.as_ref(), HASH.as_bytes());
    }

    #[test]
    fn legacy_new_repo() {
        let mut request = request();
        request.developer_address = Some(DEVELOPER);
        let addresses = RepoAddresses {
            registry_address: Some(REGISTRY),
            repo_address: None,
        };
        let tx = PublishTxBuilder::new(RegistryDialect::Legacy)
            .build_publish_tx(&request, &addresses)
            .unwrap();
        assert_eq!(tx.to, REGISTRY);

        let call = ApmRegistry::newRepoWithVersionCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(call.name, "foo");
        assert_eq!(call.dev, DEVELOPER);
        assert_eq!(call.initialSemanticVersion, [1, 0, 0]);
    }

    #[test]
    fn new_repo_requires_developer() {
        let addresses = RepoAddresses {
            registry_address: Some(REGISTRY),
            repo_address: None,
        };
        for dialect in [RegistryDialect::Legacy, RegistryDialect::Dpm] {
            let err = PublishTxBuilder::new(dialect)
                .build_publish_tx(&request(), &addresses)
                .unwrap_err();
            assert_eq!(err.to_string(), "developerAddress must be defined for new repos");
        }
    }

    #[test]
    fn legacy_new_repo_requires_registry() {
        let mut request = request();
        request.developer_address = Some(DEVELOPER);
        let err = PublishTxBuilder::new(RegistryDialect::Legacy)
            .build_publish_tx(&request, &RepoAddresses::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "No registry found for foo.public.dappnode.eth");
    }

    #[test]
    fn missing_fields() {
        let mut request = request();
        request.manifest_hash = String::new();
        let err = PublishTxBuilder::new(RegistryDialect::Legacy)
            .build_publish_tx(&request, &RepoAddresses::default())
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(ref m) if m == "manifestHash must be defined"));
    }

    #[test]
    fn dpm_existing_repo() {
        let addresses = RepoAddresses {
            registry_address: None,
            repo_address: Some(REPO),
        };
        let tx = PublishTxBuilder::new(RegistryDialect::Dpm)
            .build_publish_tx(&request(), &addresses)
            .unwrap();
        assert_eq!(tx.to, REPO);
        let call = DpmRepo::newVersionCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(call.version, "1.0.0");
        assert_eq!(
            call.contentURIs,
            vec!["ipfs://QmRhdmquYoiMR5GB2dKqhLipMzdFUeyZ2eSVvTLDvndTvh".to_string()]
        );
    }

    #[test]
    fn dpm_new_package() {
        let mut request = request();
        request.dnp_name = "geth.dnp.dappnode.eth".to_string();
        request.developer_address = Some(DEVELOPER);
        let addresses = RepoAddresses {
            registry_address: Some(REGISTRY),
            repo_address: None,
        };
        let tx = PublishTxBuilder::new(RegistryDialect::Dpm)
            .build_publish_tx(&request, &addresses)
            .unwrap();
        assert_eq!(tx.to, REGISTRY);
        let call = DpmRegistry::newPackageWithVersionCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(call.name, "geth");
        assert_eq!(call.flags, DEFAULT_DPM_FLAGS);
        assert_eq!(call.dev, DEVELOPER);
    }
}
