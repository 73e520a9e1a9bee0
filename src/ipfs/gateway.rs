use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use super::IpfsError;
use crate::cid::normalize_ipfs_path;

/// File name of the package manifest inside a release directory
pub const MANIFEST_FILE_NAME: &str = "dappnode_package.json";

/// The fields of a package manifest used to pre-fill a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Package name, e.g. `geth.dnp.dappnode.eth`
    pub name: String,
    /// Semantic version of the release
    pub version: String,
}

/// Fetch the manifest of a release through an HTTP gateway.
///
/// Releases are directories containing [`MANIFEST_FILE_NAME`]; very old ones are the
/// manifest itself, so the bare hash is tried second.
pub async fn fetch_manifest(gateway: &str, hash: &str) -> Result<Manifest, IpfsError> {
    let mut gateway = gateway.trim().to_string();
    if !gateway.ends_with('/') {
        gateway.push('/');
    }
    let base = Url::parse(&gateway)?;
    let hash = normalize_ipfs_path(hash).trim_end_matches('/');
    let client = reqwest::Client::new();

    let in_directory = base.join(&format!("ipfs/{hash}/{MANIFEST_FILE_NAME}"))?;
    match get_manifest(&client, in_directory).await {
        Ok(manifest) => Ok(manifest),
        Err(err) => {
            debug!("no {MANIFEST_FILE_NAME} under {hash}: {err}");
            get_manifest(&client, base.join(&format!("ipfs/{hash}"))?)
                .await
                .map_err(|err| err.at(&gateway))
        }
    }
}

async fn get_manifest(client: &reqwest::Client, url: Url) -> Result<Manifest, IpfsError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(IpfsError::http_response(response.status()));
    }
    response.json::<Manifest>().await.map_err(IpfsError::format)
}
