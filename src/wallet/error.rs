use thiserror::Error;

use crate::chain::ChainError;

/// Errors raised by a [`Wallet`](super::Wallet)
#[derive(Debug, Error)]
pub enum WalletError {
    /// The user declined the request
    #[error("request rejected by the user")]
    Rejected,

    /// The wallet exposes no account
    #[error("wallet has no connected account")]
    NoAccount,

    /// The wallet cannot perform this operation
    #[error("wallet does not support {0}")]
    Unsupported(&'static str),

    /// Local signing failed
    #[error("signing failed: {0}")]
    Signer(#[from] alloy_signer::Error),

    /// Provider transport or RPC failure
    #[error("wallet provider error: {0}")]
    Provider(ChainError),
}

impl From<ChainError> for WalletError {
    fn from(err: ChainError) -> Self {
        if err.is_user_rejection() {
            WalletError::Rejected
        } else {
            WalletError::Provider(err)
        }
    }
}
