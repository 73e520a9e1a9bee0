use async_trait::async_trait;
use bytes::Bytes;
use libipld::Cid;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};
use tokio::sync::RwLock;

use super::{AddedObject, ContentStore, DagLink, DagNode, DagPutOptions, DirectoryEntry, IpfsError};
use crate::cid::{cid_at_version, CidVersion};

/// In-process block store holding dag-pb blocks keyed by CIDv0
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    name: String,
    blocks: RwLock<HashMap<Cid, Bytes>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryContentStore {
    /// Creates a new in-memory content store
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Make every subsequent call fail, as an unreachable endpoint would
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful writes (`add` and `dag_put`)
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Whether the store holds a block for this CID, in any version
    pub async fn contains(&self, cid: &Cid) -> bool {
        match cid_at_version(cid, CidVersion::V0) {
            Ok(key) => self.blocks.read().await.contains_key(&key),
            Err(_) => false,
        }
    }

    /// Store a directory of files and return its CID
    pub async fn put_directory(&self, files: &[(&str, &[u8])]) -> Result<Cid, IpfsError> {
        let mut directory = DagNode::directory();
        for (name, content) in files {
            let added = self.add(content.to_vec()).await?;
            directory.add_link(DagLink::named(added.cid, name, added.size));
        }
        directory.sort_links();
        self.dag_put(&directory, DagPutOptions::default()).await
    }

    fn check_online(&self) -> Result<(), IpfsError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(IpfsError::unavailable().at(&self.endpoint()))
        } else {
            Ok(())
        }
    }

    async fn put_block(&self, node: &DagNode) -> Result<Cid, IpfsError> {
        let block = node.encode();
        let cid = crate::cid::dag_pb_cid(&block)?;
        self.blocks.write().await.insert(cid, Bytes::from(block));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(cid)
    }

    async fn get_block(&self, cid: &Cid) -> Result<Bytes, IpfsError> {
        let key = cid_at_version(cid, CidVersion::V0)?;
        self.blocks
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or_else(|| IpfsError::not_found(cid).at(&self.endpoint()))
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    fn endpoint(&self) -> String {
        format!("memory://{}", self.name)
    }

    async fn list(&self, cid: &Cid) -> Result<Vec<DirectoryEntry>, IpfsError> {
        self.check_online()?;
        let node = DagNode::decode(&self.get_block(cid).await?)?;
        Ok(node
            .links
            .into_iter()
            .map(|link| DirectoryEntry {
                name: link.name.unwrap_or_default(),
                cid: link.hash,
                size: link.tsize.unwrap_or_default(),
            })
            .collect())
    }

    async fn add(&self, bytes: Vec<u8>) -> Result<AddedObject, IpfsError> {
        self.check_online()?;
        let node = DagNode::file(&bytes);
        let size = node.cumulative_size();
        let cid = self.put_block(&node).await?;
        Ok(AddedObject { cid, size })
    }

    async fn dag_get(&self, cid: &Cid) -> Result<DagNode, IpfsError> {
        self.check_online()?;
        DagNode::decode(&self.get_block(cid).await?)
    }

    async fn dag_put(&self, node: &DagNode, _options: DagPutOptions) -> Result<Cid, IpfsError> {
        self.check_online()?;
        self.put_block(node).await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn directory_round_trip() -> Result<(), IpfsError> {
        let store = MemoryContentStore::new("test");
        let root = store
            .put_directory(&[("b.txt", b"bee"), ("a.txt", b"ay")])
            .await?;
        let entries = store.list(&root).await?;
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert!(store.contains(&entries[0].cid).await);
        // Two files plus the directory
        assert_eq!(store.writes(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn lookups_ignore_cid_version() -> Result<(), IpfsError> {
        let store = MemoryContentStore::new("test");
        let root = store.put_directory(&[("a.txt", b"ay")]).await?;
        let v1 = root.into_v1().map_err(crate::cid::CidError::from)?;
        assert_eq!(store.list(&v1).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn offline_store_fails() {
        let store = MemoryContentStore::new("down");
        store.set_offline(true);
        let err = store.add(b"x".to_vec()).await.unwrap_err();
        assert_eq!(err.endpoint(), Some("memory://down"));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn missing_block() {
        let store = MemoryContentStore::new("test");
        let cid = DagNode::directory().cid().unwrap();
        assert!(store.dag_get(&cid).await.unwrap_err().is_not_found());
    }
}
