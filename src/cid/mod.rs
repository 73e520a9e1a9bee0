//! Presentation of content identifiers.
//!
//! A CID's version and multibase are presentation only: the same multihash can be
//! rendered as `Qm…` (v0, base58btc) or `bafy…` (v1, base32) and still name the same
//! bytes. Everything that gets signed or compared goes through this module so the
//! rendering is fixed.

mod error;

pub use error::CidError;

use libipld::{
    cid::{multibase::Base, Version},
    multihash::Multihash,
    Cid,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};

/// Multicodec code of dag-pb (UnixFS directories and files)
pub const DAG_PB: u64 = 0x70;
/// Multihash code of sha2-256
pub const SHA2_256: u64 = 0x12;

/// Path prefixes accepted in front of a CID
const IPFS_PATH_PREFIXES: [&str; 3] = ["/ipfs/", "ipfs/", "ipfs://"];

/// CID version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CidVersion {
    /// Legacy base58btc-only multihash
    V0,
    /// Self-describing version, any multibase
    V1,
}

impl Display for CidVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CidVersion::V0 => f.write_str("0"),
            CidVersion::V1 => f.write_str("1"),
        }
    }
}

impl Serialize for CidVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CidVersion::V0 => serializer.serialize_u8(0),
            CidVersion::V1 => serializer.serialize_u8(1),
        }
    }
}

impl<'de> Deserialize<'de> for CidVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(CidVersion::V0),
            1 => Ok(CidVersion::V1),
            other => Err(serde::de::Error::custom(format!(
                "unknown CID version {other}"
            ))),
        }
    }
}

/// Multibase used when rendering a CID as a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CidBase {
    /// `z…` / bare `Qm…`
    Base58Btc,
    /// `b…`, lowercase
    Base32,
    /// `m…`
    Base64,
    /// `u…`
    Base64Url,
}

impl CidBase {
    fn multibase(self) -> Base {
        match self {
            CidBase::Base58Btc => Base::Base58Btc,
            CidBase::Base32 => Base::Base32Lower,
            CidBase::Base64 => Base::Base64,
            CidBase::Base64Url => Base::Base64Url,
        }
    }
}

impl Display for CidBase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CidBase::Base58Btc => "base58btc",
            CidBase::Base32 => "base32",
            CidBase::Base64 => "base64",
            CidBase::Base64Url => "base64url",
        })
    }
}

/// A fixed (version, base) rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidFormat {
    /// Version the CID is converted to before rendering
    pub version: CidVersion,
    /// Multibase of the rendered string
    pub base: CidBase,
}

impl CidFormat {
    /// The rendering used for signed release listings
    pub const V0_BASE58BTC: CidFormat = CidFormat {
        version: CidVersion::V0,
        base: CidBase::Base58Btc,
    };
}

/// Strip a leading `/ipfs/`, `ipfs/` or `ipfs://`
pub fn normalize_ipfs_path(path: &str) -> &str {
    let path = path.trim();
    for prefix in IPFS_PATH_PREFIXES {
        if let Some(rest) = path.strip_prefix(prefix) {
            return rest;
        }
    }
    path
}

/// Parse a CID, tolerating IPFS path prefixes and trailing slashes
pub fn parse_cid(input: &str) -> Result<Cid, CidError> {
    let hash = normalize_ipfs_path(input).trim_end_matches('/');
    Cid::try_from(hash).map_err(|source| CidError::Parse {
        input: input.to_string(),
        source,
    })
}

/// Whether the input is a CID or an IPFS path to one
pub fn is_ipfs_hash(input: &str) -> bool {
    !input.trim().is_empty() && parse_cid(input).is_ok()
}

/// Convert a CID to the requested version.
///
/// v1 → v0 only works for dag-pb nodes hashed with sha2-256.
pub fn cid_at_version(cid: &Cid, version: CidVersion) -> Result<Cid, CidError> {
    match (cid.version(), version) {
        (Version::V0, CidVersion::V0) | (Version::V1, CidVersion::V1) => Ok(*cid),
        (Version::V0, CidVersion::V1) => Ok(cid.into_v1()?),
        (Version::V1, CidVersion::V0) => {
            let hash = cid.hash();
            if cid.codec() != DAG_PB || hash.code() != SHA2_256 || hash.size() != 32 {
                return Err(CidError::NotV0Compatible(cid.to_string()));
            }
            Ok(Cid::new_v0(*hash)?)
        }
    }
}

/// Render a CID at a fixed version and multibase
pub fn format_cid(cid: &Cid, format: CidFormat) -> Result<String, CidError> {
    let cid = cid_at_version(cid, format.version)?;
    match (format.version, format.base) {
        (CidVersion::V0, CidBase::Base58Btc) => Ok(cid.to_string()),
        (CidVersion::V0, base) => Err(CidError::UnsupportedBase {
            version: CidVersion::V0,
            base,
        }),
        (CidVersion::V1, base) => Ok(cid.to_string_of_base(base.multibase())?),
    }
}

/// The CIDv0 of a dag-pb block
pub fn dag_pb_cid(block: &[u8]) -> Result<Cid, CidError> {
    let digest = Sha256::digest(block);
    let hash = Multihash::wrap(SHA2_256, &digest)?;
    Ok(Cid::new_v0(hash)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    const V0: &str = "QmRhdmquYoiMR5GB2dKqhLipMzdFUeyZ2eSVvTLDvndTvh";

    #[test_case("QmRhdmquYoiMR5GB2dKqhLipMzdFUeyZ2eSVvTLDvndTvh" ; "bare")]
    #[test_case("/ipfs/QmRhdmquYoiMR5GB2dKqhLipMzdFUeyZ2eSVvTLDvndTvh" ; "absolute path")]
    #[test_case("ipfs/QmRhdmquYoiMR5GB2dKqhLipMzdFUeyZ2eSVvTLDvndTvh" ; "relative path")]
    #[test_case("ipfs://QmRhdmquYoiMR5GB2dKqhLipMzdFUeyZ2eSVvTLDvndTvh" ; "uri")]
    fn prefixes_are_stripped(input: &str) {
        assert_eq!(normalize_ipfs_path(input), V0);
        assert_eq!(parse_cid(input).unwrap().to_string(), V0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(!is_ipfs_hash("noop"));
        assert!(!is_ipfs_hash(""));
        assert!(is_ipfs_hash(V0));
    }

    #[test]
    fn v0_v1_conversion_preserves_identity() {
        let v0 = parse_cid(V0).unwrap();
        let v1 = cid_at_version(&v0, CidVersion::V1).unwrap();
        assert_eq!(v1.version(), Version::V1);
        assert!(v1.to_string().starts_with("bafy"));
        let back = cid_at_version(&v1, CidVersion::V0).unwrap();
        assert_eq!(back, v0);
        assert_eq!(v0.hash(), v1.hash());
    }

    #[test]
    fn raw_leaves_have_no_v0_form() {
        let v0 = parse_cid(V0).unwrap();
        let raw = Cid::new_v1(0x55, *v0.hash());
        assert!(matches!(
            cid_at_version(&raw, CidVersion::V0),
            Err(CidError::NotV0Compatible(_))
        ));
    }

    #[test_case(CidBase::Base58Btc, 'z')]
    #[test_case(CidBase::Base32, 'b')]
    #[test_case(CidBase::Base64, 'm')]
    #[test_case(CidBase::Base64Url, 'u')]
    fn v1_multibase_prefix(base: CidBase, prefix: char) {
        let cid = parse_cid(V0).unwrap();
        let rendered = format_cid(
            &cid,
            CidFormat {
                version: CidVersion::V1,
                base,
            },
        )
        .unwrap();
        assert!(rendered.starts_with(prefix), "{rendered}");
        assert_eq!(parse_cid(&rendered).unwrap(), cid.into_v1().unwrap());
    }

    #[test]
    fn v0_renders_only_as_base58btc() {
        let cid = parse_cid(V0).unwrap();
        assert_eq!(format_cid(&cid, CidFormat::V0_BASE58BTC).unwrap(), V0);
        let v1 = cid.into_v1().unwrap();
        assert_eq!(format_cid(&v1, CidFormat::V0_BASE58BTC).unwrap(), V0);
        assert!(format_cid(
            &cid,
            CidFormat {
                version: CidVersion::V0,
                base: CidBase::Base32
            }
        )
        .is_err());
    }

    #[test]
    fn format_serializes_like_the_signature_file() {
        let json = serde_json::to_string(&CidFormat::V0_BASE58BTC).unwrap();
        assert_eq!(json, r#"{"version":0,"base":"base58btc"}"#);
        let parsed: CidFormat = serde_json::from_str(r#"{"version":1,"base":"base64url"}"#).unwrap();
        assert_eq!(parsed.version, CidVersion::V1);
        assert_eq!(parsed.base, CidBase::Base64Url);
    }

    #[test]
    fn dag_pb_cid_is_v0() {
        let cid = dag_pb_cid(b"\x0a\x02\x08\x01").unwrap();
        assert_eq!(cid.version(), Version::V0);
        assert_eq!(cid.codec(), DAG_PB);
        assert!(cid.to_string().starts_with("Qm"));
    }
}
