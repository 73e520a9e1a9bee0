use super::RegistryError;

/// Split a package name at its first dot.
///
/// `geth.dnp.dappnode.eth` → (`geth`, `dnp.dappnode.eth`)
pub fn parse_dpm_dnp_name(dnp_name: &str) -> Result<(&str, &str), RegistryError> {
    match dnp_name.split_once('.') {
        Some((repo, registry)) if !repo.is_empty() && !registry.is_empty() => Ok((repo, registry)),
        _ => Err(RegistryError::InvalidName(dnp_name.to_string())),
    }
}

/// The first label of a package name, used as the repository name when creating it
pub fn short_name(dnp_name: &str) -> &str {
    dnp_name.split('.').next().unwrap_or(dnp_name)
}

/// Parse `major.minor.patch` into the `uint16[3]` version of legacy repositories
pub fn parse_semantic_version(version: &str) -> Result<[u16; 3], RegistryError> {
    let invalid = || RegistryError::Validation(format!("invalid version {version:?}"));
    let mut parts = version.trim().split('.');
    let mut semantic = [0u16; 3];
    for slot in semantic.iter_mut() {
        *slot = parts
            .next()
            .and_then(|part| part.parse::<u16>().ok())
            .ok_or_else(invalid)?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(semantic)
}

/// Render a `uint16[3]` version as `x.y.z`
pub fn format_semantic_version(version: &[u16; 3]) -> String {
    version.map(|part| part.to_string()).join(".")
}
