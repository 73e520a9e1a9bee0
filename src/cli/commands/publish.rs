use colored::Colorize;
use tracing::info;

use super::{
    resolve::{locate_package, PackageLocation},
    ReleaseArgs,
};
use crate::{
    chain::{JsonRpcClient, TransactionRequest},
    cli::CliError,
    config::GlobalConfig,
    registry::{
        check_dpm_permissions, dpm_registry_address, ensure_can_publish, parse_address,
        parse_dpm_dnp_name, PublishRequest, PublishTxBuilder, RegistryDialect,
    },
    wallet::{RpcWallet, Wallet},
};

impl ReleaseArgs {
    fn into_request(self) -> Result<PublishRequest, CliError> {
        let developer_address = self.developer.as_deref().map(parse_address).transpose()?;
        Ok(PublishRequest {
            dnp_name: self.name,
            version: self.version,
            manifest_hash: self.hash,
            developer_address,
        })
    }
}

pub(super) async fn build_tx(global: &GlobalConfig, release: ReleaseArgs) -> Result<String, CliError> {
    let client = JsonRpcClient::new(global.rpc_url()?)?;
    let request = release.into_request()?;
    let PackageLocation { dialect, addresses } =
        locate_package(global, &client, &request.dnp_name).await?;
    let tx = PublishTxBuilder::new(dialect).build_publish_tx(&request, &addresses)?;
    Ok(serde_json::to_string_pretty(&tx)?)
}

pub(super) async fn publish(global: &GlobalConfig, release: ReleaseArgs) -> Result<String, CliError> {
    let rpc_url = global.rpc_url()?;
    let client = JsonRpcClient::new(rpc_url)?;
    let wallet = RpcWallet::with_client(client.clone());
    let request = release.into_request()?;
    let user = wallet.active_account().await?;

    let PackageLocation {
        dialect,
        mut addresses,
    } = locate_package(global, &client, &request.dnp_name).await?;
    match dialect {
        RegistryDialect::Legacy => {
            ensure_can_publish(&client, &request.dnp_name, &addresses, user).await?
        }
        RegistryDialect::Dpm => {
            let (repo_name, registry_name) = parse_dpm_dnp_name(&request.dnp_name)?;
            let registry = dpm_registry_address(&request.dnp_name, global)?.to_address()?;
            addresses = check_dpm_permissions(&client, registry_name, registry, repo_name, user)
                .await?
                .addresses();
        }
    }

    let tx: TransactionRequest = PublishTxBuilder::new(dialect)
        .build_publish_tx(&request, &addresses)?
        .from(user);
    info!("publishing {} {} from {user}", request.dnp_name, request.version);
    let tx_hash = wallet.send_transaction(&tx).await?;
    Ok(format!(
        "{}\ntransaction:\t{tx_hash}",
        "<< RELEASE PUBLISHED >>".green()
    ))
}
