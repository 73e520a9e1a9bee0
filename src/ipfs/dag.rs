use bytes::Bytes;
use libipld::{
    pb::{PbLink, PbNode},
    Cid,
};
use std::cmp::Ordering;

use super::IpfsError;
use crate::cid::dag_pb_cid;

/// UnixFS `Data.Type` of a directory
const UNIXFS_DIRECTORY: u64 = 1;
/// UnixFS `Data.Type` of a file
const UNIXFS_FILE: u64 = 2;

/// A named link inside a dag-pb node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagLink {
    /// Target of the link
    pub hash: Cid,
    /// Entry name within the directory, absent on unnamed links
    pub name: Option<String>,
    /// Cumulative size of the target DAG, when recorded
    pub tsize: Option<u64>,
}

impl DagLink {
    /// A named link with its cumulative size, as UnixFS directories write them
    pub fn named(hash: Cid, name: &str, tsize: u64) -> Self {
        Self {
            hash,
            name: Some(name.to_string()),
            tsize: Some(tsize),
        }
    }

    /// Entry name, empty for unnamed links
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Canonical dag-pb ordering: by name bytes, then by the raw link bytes.
    /// A missing name sorts as the empty name.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.name()
            .as_bytes()
            .cmp(other.name().as_bytes())
            .then_with(|| self.hash.to_bytes().cmp(&other.hash.to_bytes()))
    }
}

/// A dag-pb node: optional UnixFS data plus an ordered list of links
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DagNode {
    /// UnixFS payload
    pub data: Option<Bytes>,
    /// Links, kept in canonical order by [`DagNode::sort_links`]
    pub links: Vec<DagLink>,
}

impl DagNode {
    /// An empty UnixFS directory
    pub fn directory() -> Self {
        Self {
            data: Some(Bytes::from(unixfs_data(UNIXFS_DIRECTORY, None))),
            links: Vec::new(),
        }
    }

    /// A single-block UnixFS file
    pub fn file(content: &[u8]) -> Self {
        Self {
            data: Some(Bytes::from(unixfs_data(UNIXFS_FILE, Some(content)))),
            links: Vec::new(),
        }
    }

    /// Decode a dag-pb block
    pub fn decode(block: &[u8]) -> Result<Self, IpfsError> {
        let node = PbNode::from_bytes(Bytes::copy_from_slice(block))
            .map_err(|err| IpfsError::dag_codec(err.to_string()))?;
        let links = node
            .links
            .into_iter()
            .map(|link| DagLink {
                hash: link.cid,
                name: link.name,
                tsize: link.size,
            })
            .collect();
        Ok(Self {
            data: node.data,
            links,
        })
    }

    /// Encode as a dag-pb block
    pub fn encode(&self) -> Vec<u8> {
        let links = self
            .links
            .iter()
            .map(|link| PbLink {
                cid: link.hash,
                name: link.name.clone(),
                size: link.tsize,
            })
            .collect();
        PbNode {
            links,
            data: self.data.clone(),
        }
        .into_bytes()
        .to_vec()
    }

    /// CIDv0 of the encoded block
    pub fn cid(&self) -> Result<Cid, IpfsError> {
        dag_pb_cid(&self.encode()).map_err(IpfsError::cid)
    }

    /// Append a link; call [`DagNode::sort_links`] before encoding
    pub fn add_link(&mut self, link: DagLink) {
        self.links.push(link);
    }

    /// Restore canonical link order
    pub fn sort_links(&mut self) {
        self.links.sort_by(DagLink::canonical_cmp);
    }

    /// Whether the links are already in canonical order
    pub fn links_sorted(&self) -> bool {
        self.links
            .windows(2)
            .all(|pair| pair[0].canonical_cmp(&pair[1]) != Ordering::Greater)
    }

    /// Size reported as a link's `Tsize`: this block plus every linked DAG
    pub fn cumulative_size(&self) -> u64 {
        let linked: u64 = self.links.iter().filter_map(|link| link.tsize).sum();
        self.encode().len() as u64 + linked
    }
}

/// Minimal UnixFS `Data` message: Type, and for files the inline Data and filesize
fn unixfs_data(kind: u64, content: Option<&[u8]>) -> Vec<u8> {
    let mut buf = unsigned_varint::encode::u64_buffer();
    let mut out = vec![0x08];
    out.extend_from_slice(unsigned_varint::encode::u64(kind, &mut buf));
    if let Some(content) = content {
        if !content.is_empty() {
            out.push(0x12);
            out.extend_from_slice(unsigned_varint::encode::usize(
                content.len(),
                &mut unsigned_varint::encode::usize_buffer(),
            ));
            out.extend_from_slice(content);
        }
        out.push(0x18);
        out.extend_from_slice(unsigned_varint::encode::u64(content.len() as u64, &mut buf));
    }
    out
}
