use thiserror::Error;

use crate::{
    chain::ChainError, config::ConfigError, ipfs::IpfsError, registry::RegistryError,
    signer::SignerError, wallet::WalletError,
};

/// Anything a command can fail with
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings could not be read or are incomplete
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An IPFS node failed
    #[error(transparent)]
    Ipfs(#[from] IpfsError),

    /// Signing the release failed
    #[error(transparent)]
    Signer(#[from] SignerError),

    /// Registry lookup or transaction encoding failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The JSON-RPC endpoint failed
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The wallet refused or failed
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// The environment variable holding the signing key is not set
    #[error("environment variable {0} is not set")]
    MissingKey(String),

    /// Output could not be rendered
    #[error("unable to render output: {0}")]
    Output(#[from] serde_json::Error),

    /// A multi-step operation failed
    #[error("{context}: {source}")]
    Failed {
        /// The operation
        context: String,
        /// What went wrong
        #[source]
        source: Box<CliError>,
    },
}

impl CliError {
    /// Wrap any failure of an operation with a message naming it
    pub fn context(context: impl Into<String>) -> impl FnOnce(CliError) -> Self {
        let context = context.into();
        move |source| CliError::Failed {
            context,
            source: Box::new(source),
        }
    }
}
