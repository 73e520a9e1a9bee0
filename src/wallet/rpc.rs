use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use super::{Wallet, WalletError, WalletEvent, EVENT_CAPACITY};
use crate::chain::{JsonRpcClient, TransactionRequest};

#[derive(Debug, Default)]
struct KnownState {
    accounts: Option<Vec<Address>>,
    chain_id: Option<u64>,
}

/// A wallet reached through a JSON-RPC provider that manages the keys,
/// e.g. a node with unlocked accounts or a signer proxy.
#[derive(Debug)]
pub struct RpcWallet {
    client: JsonRpcClient,
    events: broadcast::Sender<WalletEvent>,
    known: Mutex<KnownState>,
}

impl RpcWallet {
    /// Connect to the provider at `url`
    pub fn new(url: &str) -> Result<Self, WalletError> {
        Ok(Self::with_client(JsonRpcClient::new(url)?))
    }

    /// Reuse an existing JSON-RPC client
    pub fn with_client(client: JsonRpcClient) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            events,
            known: Mutex::new(KnownState::default()),
        }
    }

    /// Poll the provider and emit [`WalletEvent`]s for whatever changed since
    /// the previous poll. The first poll only records the state.
    pub async fn refresh(&self) -> Result<(), WalletError> {
        let accounts: Vec<Address> = self.client.request("eth_accounts", [(); 0]).await?;
        let chain_id = self.client.chain_id().await?;

        let mut known = self.known.lock().await;
        if let Some(previous) = &known.accounts {
            if *previous != accounts {
                info!("wallet accounts changed");
                // No receivers is not an error
                let _ = self.events.send(WalletEvent::AccountsChanged(accounts.clone()));
            }
        }
        if let Some(previous) = known.chain_id {
            if previous != chain_id {
                info!("wallet network changed from {previous} to {chain_id}");
                let _ = self.events.send(WalletEvent::ChainChanged(chain_id));
            }
        }
        known.accounts = Some(accounts);
        known.chain_id = Some(chain_id);
        Ok(())
    }
}

#[async_trait]
impl Wallet for RpcWallet {
    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(self.client.request("eth_accounts", [(); 0]).await?)
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.client.chain_id().await?)
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, WalletError> {
        let account = self.active_account().await?;
        debug!("requesting personal_sign from {account}");
        let payload = format!("0x{}", hex::encode(message));
        Ok(self
            .client
            .request("personal_sign", (payload, account))
            .await?)
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, WalletError> {
        let tx = match tx.from {
            Some(_) => tx.clone(),
            None => tx.clone().from(self.active_account().await?),
        };
        Ok(self.client.request("eth_sendTransaction", [tx]).await?)
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use wiremock::{
        matchers::{body_partial_json, method},
        Mock, MockServer, ResponseTemplate,
    };

    const ACCOUNT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    async fn respond(server: &MockServer, rpc_method: &str, result: serde_json::Value) {
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "method": rpc_method })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": result})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn personal_sign_uses_active_account() {
        let server = MockServer::start().await;
        respond(&server, "eth_accounts", serde_json::json!([ACCOUNT])).await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "method": "personal_sign",
                "params": ["0x516d"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"jsonrpc": "2.0", "id": 2, "result": "0xsigned"}),
            ))
            .mount(&server)
            .await;

        let wallet = RpcWallet::new(&server.uri()).unwrap();
        assert_eq!(wallet.sign_message(b"Qm").await.unwrap(), "0xsigned");
    }

    #[tokio::test]
    async fn user_rejection_is_mapped() {
        let server = MockServer::start().await;
        respond(&server, "eth_accounts", serde_json::json!([ACCOUNT])).await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"method": "personal_sign"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0", "id": 2,
                "error": {"code": 4001, "message": "User denied message signature."}
            })))
            .mount(&server)
            .await;

        let wallet = RpcWallet::new(&server.uri()).unwrap();
        assert!(matches!(
            wallet.sign_message(b"Qm").await,
            Err(WalletError::Rejected)
        ));
    }

    #[tokio::test]
    async fn no_accounts() {
        let server = MockServer::start().await;
        respond(&server, "eth_accounts", serde_json::json!([])).await;
        let wallet = RpcWallet::new(&server.uri()).unwrap();
        assert!(matches!(
            wallet.active_account().await,
            Err(WalletError::NoAccount)
        ));
    }

    #[tokio::test]
    async fn refresh_emits_changes() {
        let first = MockServer::start().await;
        respond(&first, "eth_accounts", serde_json::json!([ACCOUNT])).await;
        respond(&first, "eth_chainId", serde_json::json!("0x1")).await;

        let wallet = RpcWallet::new(&first.uri()).unwrap();
        let mut events = wallet.subscribe();
        wallet.refresh().await.unwrap();
        // Nothing changed on a second poll
        wallet.refresh().await.unwrap();
        assert!(events.try_recv().is_err());

        first.reset().await;
        respond(&first, "eth_accounts", serde_json::json!([])).await;
        respond(&first, "eth_chainId", serde_json::json!("0x64")).await;
        wallet.refresh().await.unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            WalletEvent::AccountsChanged(vec![])
        );
        assert_eq!(events.try_recv().unwrap(), WalletEvent::ChainChanged(100));
    }
}
