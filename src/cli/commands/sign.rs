use colored::Colorize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    cli::CliError,
    config::GlobalConfig,
    ipfs::{fetch_manifest, kubo_stores},
    signer::ReleaseSigner,
    wallet::{LocalWallet, RpcWallet, Wallet},
};

/// Chain id given to key-file wallets; signatures over releases do not depend on it
const LOCAL_WALLET_CHAIN_ID: u64 = 1;

fn wallet(
    global: &GlobalConfig,
    private_key_env: Option<String>,
    rpc: bool,
) -> Result<Arc<dyn Wallet>, CliError> {
    match private_key_env {
        Some(var) if !rpc => {
            let key = std::env::var(&var).map_err(|_| CliError::MissingKey(var))?;
            let wallet = LocalWallet::from_private_key(key.trim(), LOCAL_WALLET_CHAIN_ID)?;
            info!("signing with local key of {}", wallet.address());
            Ok(Arc::new(wallet))
        }
        _ => Ok(Arc::new(RpcWallet::new(global.rpc_url()?)?)),
    }
}

pub(super) async fn sign(
    global: &GlobalConfig,
    release: &str,
    ipfs: Vec<String>,
    private_key_env: Option<String>,
    rpc: bool,
) -> Result<String, CliError> {
    let urls = if ipfs.is_empty() {
        global.ipfs_api_urls.clone()
    } else {
        ipfs
    };
    let stores = kubo_stores(&urls)?;

    // Only for display, the release is signed whatever the manifest says
    match fetch_manifest(&global.ipfs_gateway_url, release).await {
        Ok(manifest) => info!("signing {} version {}", manifest.name, manifest.version),
        Err(err) => warn!("unable to read the release manifest: {err}"),
    }

    let signer = ReleaseSigner::new(wallet(global, private_key_env, rpc)?);
    let signed = signer.sign_release(release, &stores).await?;
    Ok(format!(
        "{}\n/ipfs/{}",
        "<< RELEASE SIGNED >>".green(),
        signed
    ))
}
