//! Ethereum JSON-RPC plumbing shared by the wallet and the registry readers

mod error;
mod rpc;

pub use error::{ChainError, USER_REJECTED_CODE};
pub use rpc::JsonRpcClient;

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

/// An unsigned contract call, ready to hand to a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Sender, filled in by the wallet when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Contract to call
    pub to: Address,
    /// ABI-encoded call data
    pub data: Bytes,
}

impl TransactionRequest {
    /// A call of `data` on `to`
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from: None,
            to,
            data: data.into(),
        }
    }

    /// Set the sender
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }
}
