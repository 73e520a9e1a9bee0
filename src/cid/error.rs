use thiserror::Error;

use super::{CidBase, CidVersion};

/// Errors raised while parsing or re-encoding content identifiers
#[derive(Debug, Error)]
pub enum CidError {
    /// The string is not a CID, with or without an IPFS path prefix
    #[error("invalid CID {input:?}: {source}")]
    Parse {
        /// Offending input
        input: String,
        /// Underlying cid error
        #[source]
        source: libipld::cid::Error,
    },

    /// Only dag-pb / sha2-256 CIDs have a version 0 form
    #[error("CID {0} cannot be represented as CIDv0")]
    NotV0Compatible(String),

    /// CIDv0 is always base58btc
    #[error("CID version {version} cannot be rendered in {base}")]
    UnsupportedBase {
        /// Requested version
        version: CidVersion,
        /// Requested base
        base: CidBase,
    },

    /// Generic failure from the cid crate
    #[error("CID encoding error: {0}")]
    Encoding(#[from] libipld::cid::Error),

    /// Failure wrapping a digest in a multihash
    #[error("multihash error: {0}")]
    Multihash(#[from] libipld::multihash::Error),
}
