//! On-chain package registries.
//!
//! Packages live either in Aragon package manager repos found through ENS
//! ([`RegistryDialect::Legacy`]) or in DAppNode package manager registries listed in
//! the configuration ([`RegistryDialect::Dpm`]). This module resolves where a package
//! lives, checks the user may publish it and encodes the publish transaction.

pub mod abi;
mod dialect;
mod eip3770;
mod ens;
mod error;
mod names;
mod ownership;
mod permissions;
mod publish;

pub use dialect::{format_content_uri, RegistryDialect};
pub use eip3770::{
    format_eip3770_address, known_chain_id, parse_address, parse_eip3770_address,
    Eip3770Address,
};
pub use ens::{namehash, resolve_dnp_name, EnsResolver};
pub use error::RegistryError;
pub use names::{
    format_semantic_version, parse_dpm_dnp_name, parse_semantic_version, short_name,
};
pub use ownership::{acl_address, build_grant_developer_tx, build_set_manager_tx, permission_manager};
pub use permissions::{
    apm_repo_is_allowed, check_dpm_permissions, dpm_registry_address, ensure_can_publish,
    latest_version, resolve_dpm_package, DpmStatus, APM_CREATE_VERSION_ROLE,
};
pub use publish::{PublishRequest, PublishTxBuilder, RepoAddresses, DEFAULT_DPM_FLAGS};
