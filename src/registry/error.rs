use thiserror::Error;

use crate::{chain::ChainError, config::ConfigError};

/// Errors raised while resolving packages or building registry transactions
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// The connected account may not perform the operation
    #[error("{0}")]
    Permission(String),

    /// Malformed package or registry name
    #[error("invalid name {0:?}")]
    InvalidName(String),

    /// Malformed address
    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress {
        /// Offending input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// The registry is not known to this configuration
    #[error("unknown registry {0}")]
    UnknownRegistry(String),

    /// A contract read or RPC call failed
    #[error("{context}: {source}")]
    Chain {
        /// What was being done
        context: String,
        /// Underlying failure
        #[source]
        source: ChainError,
    },

    /// Missing configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RegistryError {
    /// Wrap a chain failure with a message naming the operation
    pub fn chain(context: impl Into<String>) -> impl FnOnce(ChainError) -> Self {
        let context = context.into();
        move |source| RegistryError::Chain { context, source }
    }
}
