//! Wallet connectors: message signing and transaction submission

mod error;
mod local;
mod rpc;

pub use error::WalletError;
pub use local::LocalWallet;
pub use rpc::RpcWallet;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::chain::TransactionRequest;

/// Capacity of the event channel handed out by [`Wallet::subscribe`]
pub const EVENT_CAPACITY: usize = 16;

/// State change reported by a wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The exposed accounts changed
    AccountsChanged(Vec<Address>),
    /// The selected network changed
    ChainChanged(u64),
}

/// Anything that can sign personal messages and submit transactions for a user
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Accounts exposed by the wallet, the first one being active
    async fn accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Currently selected chain id
    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// EIP-191 personal signature of `message` by the active account, as
    /// `0x`-prefixed hex of the 65 byte `r || s || v` encoding
    async fn sign_message(&self, message: &[u8]) -> Result<String, WalletError>;

    /// Submit a transaction and return its hash
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, WalletError>;

    /// Subscribe to account and network changes
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;

    /// The active account
    async fn active_account(&self) -> Result<Address, WalletError> {
        self.accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(WalletError::NoAccount)
    }
}

#[async_trait]
impl<T: Wallet + ?Sized> Wallet for Arc<T> {
    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        (**self).accounts().await
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        (**self).chain_id().await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, WalletError> {
        (**self).sign_message(message).await
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, WalletError> {
        (**self).send_transaction(tx).await
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        (**self).subscribe()
    }
}
