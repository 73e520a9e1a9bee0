//! Content-addressed storage backends.
//!
//! The signer only needs four operations from an IPFS node, captured by
//! [`ContentStore`]. [`KuboClient`] speaks the Kubo HTTP RPC API,
//! [`MemoryContentStore`] keeps blocks in process.

mod dag;
mod error;
mod gateway;
mod kubo;
mod memory;
mod requests;

pub use dag::{DagLink, DagNode};
pub use error::{IpfsError, KuboErrorResponse};
pub use gateway::{fetch_manifest, Manifest, MANIFEST_FILE_NAME};
pub use kubo::KuboClient;
pub use memory::MemoryContentStore;

use async_trait::async_trait;
use libipld::Cid;
use std::sync::Arc;

/// One link of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Entry name
    pub name: String,
    /// Entry content
    pub cid: Cid,
    /// Size as reported by the store
    pub size: u64,
}

/// Result of adding bytes to a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedObject {
    /// CID of the new object
    pub cid: Cid,
    /// Cumulative size, used as the `Tsize` of links pointing at it
    pub size: u64,
}

/// Block format accepted by [`ContentStore::dag_put`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DagFormat {
    /// Protobuf directory node
    #[default]
    DagPb,
}

impl DagFormat {
    /// Multicodec name
    pub fn as_str(&self) -> &'static str {
        match self {
            DagFormat::DagPb => "dag-pb",
        }
    }
}

/// Hash function used by [`ContentStore::dag_put`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlg {
    /// sha2-256
    #[default]
    Sha2_256,
}

impl HashAlg {
    /// Multihash name
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlg::Sha2_256 => "sha2-256",
        }
    }
}

/// Options of a DAG put
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DagPutOptions {
    /// Block format
    pub format: DagFormat,
    /// Hash function
    pub hash_alg: HashAlg,
}

/// The operations the release signer needs from an IPFS node
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Human readable location, used in logs and errors
    fn endpoint(&self) -> String;
    /// List the entries of a directory
    async fn list(&self, cid: &Cid) -> Result<Vec<DirectoryEntry>, IpfsError>;
    /// Store bytes as a file
    async fn add(&self, bytes: Vec<u8>) -> Result<AddedObject, IpfsError>;
    /// Fetch a dag-pb node
    async fn dag_get(&self, cid: &Cid) -> Result<DagNode, IpfsError>;
    /// Store a dag-pb node
    async fn dag_put(&self, node: &DagNode, options: DagPutOptions) -> Result<Cid, IpfsError>;
}

#[async_trait]
impl<T: ContentStore + ?Sized> ContentStore for Arc<T> {
    fn endpoint(&self) -> String {
        (**self).endpoint()
    }

    async fn list(&self, cid: &Cid) -> Result<Vec<DirectoryEntry>, IpfsError> {
        (**self).list(cid).await
    }

    async fn add(&self, bytes: Vec<u8>) -> Result<AddedObject, IpfsError> {
        (**self).add(bytes).await
    }

    async fn dag_get(&self, cid: &Cid) -> Result<DagNode, IpfsError> {
        (**self).dag_get(cid).await
    }

    async fn dag_put(&self, node: &DagNode, options: DagPutOptions) -> Result<Cid, IpfsError> {
        (**self).dag_put(node, options).await
    }
}

/// One [`KuboClient`] per API URL, in order, the first being the primary
pub fn kubo_stores(urls: &[String]) -> Result<Vec<Arc<dyn ContentStore>>, IpfsError> {
    urls.iter()
        .map(|url| Ok(Arc::new(KuboClient::new(url)?) as Arc<dyn ContentStore>))
        .collect()
}

/// Split a comma or whitespace separated list of IPFS API URLs
pub fn parse_ipfs_urls(urls: &str) -> Vec<String> {
    urls.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod test {
    use super::parse_ipfs_urls;

    #[test]
    fn ipfs_url_lists() {
        assert_eq!(
            parse_ipfs_urls("http://a:5001, http://b:5001\nhttp://c:5001,,"),
            vec!["http://a:5001", "http://b:5001", "http://c:5001"]
        );
        assert!(parse_ipfs_urls("  ").is_empty());
    }
}
