//! Signing and publishing of DAppNode package releases.
//!
//! A release is an IPFS directory. [`signer::ReleaseSigner`] adds a detached
//! signature to it, [`registry`] finds where the package lives on chain and encodes
//! the transaction publishing the signed release, and [`wizard`] models the
//! interactive flow tying both together.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]

pub mod chain;
pub mod cid;
/// CLI Parsing
pub mod cli;
pub mod config;
pub mod ipfs;
pub mod query;
pub mod registry;
pub mod signer;
pub mod wallet;
pub mod wizard;
