use thiserror::Error;

use crate::{cid::CidError, ipfs::IpfsError, wallet::WalletError};

/// Errors raised while signing a release
#[derive(Debug, Error)]
pub enum SignerError {
    /// Nothing to sign with or store to
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The release already carries a signature
    #[error("release {0} is already signed")]
    AlreadySigned(String),

    /// The release directory has no entries
    #[error("release {0} is empty")]
    EmptyRelease(String),

    /// The user declined to sign
    #[error("signature rejected by the user")]
    SignatureRejected,

    /// Any other wallet failure
    #[error("wallet error: {0}")]
    Wallet(WalletError),

    /// The signed release does not list the expected files
    #[error("wrong files in new release: expected {expected:?}, found {actual:?}")]
    Integrity {
        /// Original names plus the signature, sorted
        expected: Vec<String>,
        /// Names found in the new release, sorted
        actual: Vec<String>,
    },

    /// Failure on the primary content store
    #[error("{context}: {source}")]
    Ipfs {
        /// The step that failed
        context: String,
        /// Underlying failure
        #[source]
        source: IpfsError,
    },

    /// Bad release CID
    #[error(transparent)]
    Cid(#[from] CidError),

    /// The signature could not be serialized
    #[error("serializing signature: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SignerError {
    /// Wrap a content store failure with a message naming the step
    pub fn ipfs(context: impl Into<String>) -> impl FnOnce(IpfsError) -> Self {
        let context = context.into();
        move |source| SignerError::Ipfs { context, source }
    }
}

impl From<WalletError> for SignerError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Rejected => SignerError::SignatureRejected,
            other => SignerError::Wallet(other),
        }
    }
}
