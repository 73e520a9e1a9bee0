use thiserror::Error;

/// JSON-RPC error code used by wallets when the user declines a request (EIP-1193)
pub const USER_REJECTED_CODE: i64 = 4001;

/// Errors raised while talking to an Ethereum JSON-RPC endpoint
#[derive(Debug, Error)]
pub enum ChainError {
    /// Transport failure
    #[error("HTTP Client Error: {0}")]
    Http(#[from] reqwest::Error),

    /// Bad endpoint URL
    #[error("Invalid RPC URL: {0}")]
    Url(#[from] url::ParseError),

    /// The node answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message
        message: String,
    },

    /// Neither `result` nor `error` was present
    #[error("RPC response for {0} has no result")]
    MissingResult(String),

    /// Return data did not match the ABI
    #[error("ABI decoding failed: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    /// Response `result` had an unexpected shape
    #[error("Unexpected RPC result: {0}")]
    Format(#[from] serde_json::Error),
}

impl ChainError {
    /// The user declined the request in their wallet
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ChainError::Rpc { code, .. } if *code == USER_REJECTED_CODE)
    }

    /// An `eth_call` reverted
    pub fn is_revert(&self) -> bool {
        match self {
            ChainError::Rpc { code, message } => *code == 3 || message.contains("revert"),
            _ => false,
        }
    }
}
