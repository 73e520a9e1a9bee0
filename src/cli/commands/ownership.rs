use alloy_primitives::Address;
use async_trait::async_trait;
use clap::Subcommand;
use colored::Colorize;
use tracing::info;

use super::RunnableCommand;
use crate::{
    chain::{JsonRpcClient, TransactionRequest},
    cli::CliError,
    config::GlobalConfig,
    registry::{
        build_grant_developer_tx, build_set_manager_tx, parse_address, permission_manager,
        resolve_dnp_name, EnsResolver, RegistryError,
    },
    wallet::{RpcWallet, Wallet},
};

/// Subcommand for publishing rights on APM repos
#[derive(Subcommand, Clone, Debug)]
pub enum OwnershipCommand {
    /// Print the address allowed to grant publishing rights on a package
    Manager {
        /// Package name, e.g. geth.dnp.dappnode.eth
        dnp_name: String,
    },
    /// Allow a developer to publish new versions of a package
    GrantDeveloper {
        /// Package name
        #[arg(short, long)]
        name: String,
        /// Developer address
        #[arg(short, long)]
        developer: String,
    },
    /// Hand the manager role of a package to another address
    SetManager {
        /// Package name
        #[arg(short, long)]
        name: String,
        /// New manager address
        #[arg(long)]
        new_manager: String,
    },
}

#[async_trait(?Send)]
impl RunnableCommand<CliError> for OwnershipCommand {
    async fn run_internal(self) -> Result<String, CliError> {
        let global = GlobalConfig::from_disk()?;
        match self {
            OwnershipCommand::Manager { dnp_name } => manager(&global, &dnp_name).await,
            OwnershipCommand::GrantDeveloper { name, developer } => {
                grant_developer(&global, &name, &developer).await
            }
            OwnershipCommand::SetManager { name, new_manager } => {
                set_manager(&global, &name, &new_manager).await
            }
        }
    }
}

/// APM repos are always found through ENS, whatever registry family the config
/// assigns to their registry name
async fn repo_address(
    global: &GlobalConfig,
    client: &JsonRpcClient,
    dnp_name: &str,
) -> Result<Option<Address>, CliError> {
    let resolver = EnsResolver::new(client.clone(), global.ens_registry);
    Ok(resolve_dnp_name(&resolver, dnp_name).await?.repo_address)
}

pub(super) async fn manager(global: &GlobalConfig, dnp_name: &str) -> Result<String, CliError> {
    let client = JsonRpcClient::new(global.rpc_url()?)?;
    let repo = repo_address(global, &client, dnp_name)
        .await?
        .ok_or_else(|| RegistryError::Validation(format!("{dnp_name} has no repo")))?;
    let manager = permission_manager(&client, &global.acl, dnp_name, repo).await?;
    Ok(format!("repo:\t\t{repo}\nmanager:\t{manager}"))
}

/// Resolve the repo, build the ACL transaction with `build` and send it from the
/// wallet's active account
async fn send_acl_tx<F>(global: &GlobalConfig, dnp_name: &str, build: F) -> Result<String, CliError>
where
    F: FnOnce(Option<Address>) -> Result<TransactionRequest, RegistryError>,
{
    let client = JsonRpcClient::new(global.rpc_url()?)?;
    let wallet = RpcWallet::with_client(client.clone());
    let repo = repo_address(global, &client, dnp_name).await?;
    let user = wallet.active_account().await?;
    let tx = build(repo)?.from(user);
    info!("sending ACL transaction for {dnp_name} from {user}");
    Ok(wallet.send_transaction(&tx).await?.to_string())
}

pub(super) async fn grant_developer(
    global: &GlobalConfig,
    dnp_name: &str,
    developer: &str,
) -> Result<String, CliError> {
    let tx_hash = async {
        let developer = parse_address(developer)?;
        send_acl_tx(global, dnp_name, |repo| {
            build_grant_developer_tx(&global.acl, Some(developer), dnp_name, repo)
        })
        .await
    }
    .await
    .map_err(CliError::context(format!(
        "Error granting developer permission for {dnp_name}"
    )))?;
    Ok(format!(
        "{}\ntransaction:\t{tx_hash}",
        "<< DEVELOPER GRANTED >>".green()
    ))
}

pub(super) async fn set_manager(
    global: &GlobalConfig,
    dnp_name: &str,
    new_manager: &str,
) -> Result<String, CliError> {
    let tx_hash = async {
        let new_manager = parse_address(new_manager)?;
        send_acl_tx(global, dnp_name, |repo| {
            build_set_manager_tx(&global.acl, Some(new_manager), dnp_name, repo)
        })
        .await
    }
    .await
    .map_err(CliError::context(format!(
        "Error setting new manager address for {dnp_name}"
    )))?;
    Ok(format!(
        "{}\ntransaction:\t{tx_hash}",
        "<< MANAGER CHANGED >>".green()
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        config::AclConfig,
        registry::{
            abi::{Acl, EnsPublicResolver, EnsRegistry},
            namehash,
            testing::mock_call,
            APM_CREATE_VERSION_ROLE,
        },
    };
    use alloy_primitives::{address, B256};
    use alloy_sol_types::{SolCall, SolValue};
    use wiremock::{
        matchers::{body_partial_json, method},
        Mock, MockServer, ResponseTemplate,
    };

    const ENS: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");
    const RESOLVER: Address = address!("4976fb03C32e5B8cfe2b6cCB31c09Ba78EBaBa41");
    const REGISTRY: Address = address!("266BFdb2124A68beB6769dC887BD655f78778923");
    const REPO: Address = address!("ee66c4765696c922078e8670aa9e6d4f6ffcc455");
    const PUBLIC_ACL: Address = address!("9f85ae5aefe4a3eff39d9a44212aae21dd15079a");
    const USER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const DEVELOPER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
    const PACKAGE: &str = "foo.public.dappnode.eth";

    fn global(server: &MockServer) -> GlobalConfig {
        let mut global = GlobalConfig::default();
        global.rpc_url = Some(server.uri());
        global.ens_registry = ENS;
        global.acl = AclConfig {
            dnp: None,
            public: Some(PUBLIC_ACL),
        };
        global
    }

    async fn mock_rpc(server: &MockServer, rpc_method: &str, result: serde_json::Value) {
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "method": rpc_method })))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": result}),
            ))
            .mount(server)
            .await;
    }

    /// Resolve `name` to `target` through the ENS registry
    async fn mock_ens(server: &MockServer, name: &str, target: Address) {
        let node = namehash(name);
        mock_call(
            server,
            ENS,
            EnsRegistry::resolverCall { node },
            (RESOLVER,).abi_encode_params(),
        )
        .await;
        mock_call(
            server,
            RESOLVER,
            EnsPublicResolver::addrCall { node },
            (target,).abi_encode_params(),
        )
        .await;
    }

    /// The single transaction handed to `eth_sendTransaction`
    async fn sent_transaction(server: &MockServer) -> TransactionRequest {
        let requests = server.received_requests().await.unwrap();
        let body = requests
            .iter()
            .map(|request| serde_json::from_slice::<serde_json::Value>(&request.body).unwrap())
            .find(|body| body["method"] == "eth_sendTransaction")
            .unwrap();
        serde_json::from_value(body["params"][0].clone()).unwrap()
    }

    #[tokio::test]
    async fn grant_developer_sends_acl_tx() {
        let server = MockServer::start().await;
        mock_ens(&server, "public.dappnode.eth", REGISTRY).await;
        mock_ens(&server, PACKAGE, REPO).await;
        mock_rpc(&server, "eth_accounts", serde_json::json!([USER])).await;
        mock_rpc(
            &server,
            "eth_sendTransaction",
            serde_json::json!(B256::repeat_byte(7)),
        )
        .await;

        let output = grant_developer(&global(&server), PACKAGE, &DEVELOPER.to_string())
            .await
            .unwrap();
        assert!(output.contains(&B256::repeat_byte(7).to_string()));

        let tx = sent_transaction(&server).await;
        assert_eq!(tx.to, PUBLIC_ACL);
        assert_eq!(tx.from, Some(USER));
        let call = Acl::grantPermissionCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(call.entity, DEVELOPER);
        assert_eq!(call.app, REPO);
        assert_eq!(call.role, APM_CREATE_VERSION_ROLE);
    }

    #[tokio::test]
    async fn set_manager_sends_acl_tx() {
        let server = MockServer::start().await;
        mock_ens(&server, "public.dappnode.eth", REGISTRY).await;
        mock_ens(&server, PACKAGE, REPO).await;
        mock_rpc(&server, "eth_accounts", serde_json::json!([USER])).await;
        mock_rpc(
            &server,
            "eth_sendTransaction",
            serde_json::json!(B256::repeat_byte(9)),
        )
        .await;

        set_manager(&global(&server), PACKAGE, &DEVELOPER.to_string())
            .await
            .unwrap();
        let tx = sent_transaction(&server).await;
        assert_eq!(tx.to, PUBLIC_ACL);
        let call = Acl::setPermissionManagerCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(call.newManager, DEVELOPER);
        assert_eq!(call.app, REPO);
    }

    #[tokio::test]
    async fn unpublished_package_cannot_be_granted() {
        let server = MockServer::start().await;
        mock_ens(&server, "public.dappnode.eth", REGISTRY).await;
        mock_ens(&server, PACKAGE, Address::ZERO).await;
        mock_rpc(&server, "eth_accounts", serde_json::json!([USER])).await;

        let err = grant_developer(&global(&server), PACKAGE, &DEVELOPER.to_string())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Error granting developer permission for {PACKAGE}: repoAddress must be defined")
        );
    }

    #[tokio::test]
    async fn missing_acl_is_reported() {
        let server = MockServer::start().await;
        mock_ens(&server, "public.dappnode.eth", REGISTRY).await;
        mock_ens(&server, PACKAGE, REPO).await;
        mock_rpc(&server, "eth_accounts", serde_json::json!([USER])).await;

        let mut global = global(&server);
        global.acl = AclConfig::default();
        let err = set_manager(&global, PACKAGE, &DEVELOPER.to_string())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Error setting new manager address for {PACKAGE}: acl.public is not configured")
        );
    }

    #[tokio::test]
    async fn reads_manager() {
        let server = MockServer::start().await;
        mock_ens(&server, "public.dappnode.eth", REGISTRY).await;
        mock_ens(&server, PACKAGE, REPO).await;
        mock_call(
            &server,
            PUBLIC_ACL,
            Acl::getPermissionManagerCall {
                app: REPO,
                role: APM_CREATE_VERSION_ROLE,
            },
            (USER,).abi_encode_params(),
        )
        .await;

        let output = manager(&global(&server), PACKAGE).await.unwrap();
        assert!(output.contains(&format!("manager:\t{USER}")));
    }
}
