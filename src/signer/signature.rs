use serde::{Deserialize, Serialize};

use crate::{
    cid::{format_cid, CidError, CidFormat},
    ipfs::DirectoryEntry,
};

/// Name of the detached signature inside a release directory
pub const SIGNATURE_FILE_NAME: &str = "signature.json";

/// Current version of the [`ReleaseSignature`] format
pub const SIGNATURE_FORMAT_VERSION: u32 = 1;

/// Scheme used to produce [`ReleaseSignature::signature`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureProtocol {
    /// secp256k1 ECDSA over an EIP-191 personal message
    #[serde(rename = "ECDSA_256")]
    Ecdsa256,
}

/// The `signature.json` file added to a signed release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSignature {
    /// Format version, always [`SIGNATURE_FORMAT_VERSION`]
    pub version: u32,
    /// How the entry CIDs were rendered in the signed listing
    pub cid: CidFormat,
    /// Signature scheme
    pub signature_protocol: SignatureProtocol,
    /// `0x` prefixed hex signature of the listing
    pub signature: String,
}

impl ReleaseSignature {
    /// A version 1 ECDSA signature
    pub fn new(cid: CidFormat, signature: String) -> Self {
        Self {
            version: SIGNATURE_FORMAT_VERSION,
            cid,
            signature_protocol: SignatureProtocol::Ecdsa256,
            signature,
        }
    }

    /// The exact bytes stored as `signature.json`: JSON with two space indentation
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a stored `signature.json`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Render the listing of a release that gets signed.
///
/// Any existing [`SIGNATURE_FILE_NAME`] entry is left out. Entries are sorted by
/// name, descending, and written one per line as `<name> <cid>`, with every CID
/// converted to `format` first so the payload does not depend on how the store
/// happened to report it.
pub fn serialize_directory(
    entries: &[DirectoryEntry],
    format: CidFormat,
) -> Result<String, CidError> {
    let mut entries: Vec<&DirectoryEntry> = entries
        .iter()
        .filter(|entry| entry.name != SIGNATURE_FILE_NAME)
        .collect();
    entries.sort_by(|a, b| b.name.as_bytes().cmp(a.name.as_bytes()));

    let lines = entries
        .into_iter()
        .map(|entry| Ok(format!("{} {}", entry.name, format_cid(&entry.cid, format)?)))
        .collect::<Result<Vec<String>, CidError>>()?;
    Ok(lines.join("\n"))
}
