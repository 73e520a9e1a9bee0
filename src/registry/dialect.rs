use std::fmt::{self, Display, Formatter};

use crate::{cid::normalize_ipfs_path, config::GlobalConfig};

/// The two families of on-chain package registries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryDialect {
    /// Aragon package manager repos and registries, found through ENS
    Legacy,
    /// DAppNode package manager, configured per registry name
    Dpm,
}

impl RegistryDialect {
    /// Dialect of the registry named `registry_name`, e.g. `dnp.dappnode.eth`
    pub fn for_registry(registry_name: &str, config: &GlobalConfig) -> Self {
        if config.dpm_registries.contains_key(registry_name) {
            RegistryDialect::Dpm
        } else {
            RegistryDialect::Legacy
        }
    }
}

impl Display for RegistryDialect {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RegistryDialect::Legacy => "APM",
            RegistryDialect::Dpm => "DPM",
        })
    }
}

/// How a registry expects a release to be referenced
///
/// - Legacy: `/ipfs/QmdjrkKfD8ZAA8zHBAFC9y162R52qKcikuVXDNMKMhEsUr`
/// - Dpm: `ipfs://QmRAQB6YaCyidP37UdDnjFY5vQuiBrcqdyoW1CuDgwxkD`
pub fn format_content_uri(hash: &str, dialect: RegistryDialect) -> String {
    let hash = normalize_ipfs_path(hash);
    match dialect {
        RegistryDialect::Legacy => format!("/ipfs/{hash}"),
        RegistryDialect::Dpm => format!("ipfs://{hash}"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const HASH: &str = "QmRhdmquYoiMR5GB2dKqhLipMzdFUeyZ2eSVvTLDvndTvh";

    #[test]
    fn dialect_follows_config() {
        let mut config = GlobalConfig::default();
        config.dpm_registries.insert(
            "dnp.dappnode.eth".to_string(),
            "xdai:0x01c58A553F92A61Fd713e6006fa7D1d82044c389".to_string(),
        );
        assert_eq!(
            RegistryDialect::for_registry("dnp.dappnode.eth", &config),
            RegistryDialect::Dpm
        );
        assert_eq!(
            RegistryDialect::for_registry("public.dappnode.eth", &config),
            RegistryDialect::Legacy
        );
    }

    #[test]
    fn content_uris() {
        assert_eq!(
            format_content_uri(&format!("ipfs://{HASH}"), RegistryDialect::Legacy),
            format!("/ipfs/{HASH}")
        );
        assert_eq!(
            format_content_uri(&format!("/ipfs/{HASH}"), RegistryDialect::Dpm),
            format!("ipfs://{HASH}")
        );
    }
}
