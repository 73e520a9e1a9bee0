#![allow(dead_code)]

use dnp_publish::{
    ipfs::{ContentStore, MemoryContentStore},
    wallet::LocalWallet,
};
use std::sync::Arc;

/// Well known development key (hardhat account #0)
pub const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const MANIFEST: &[u8] = br#"{"name":"timeapp.public.dappnode.eth","version":"0.1.16"}"#;
pub const IMAGE: &[u8] = b"\x89PNG\r\n\x1a\n not really an image";

pub fn dev_wallet() -> LocalWallet {
    LocalWallet::from_private_key(DEV_KEY, 1).unwrap()
}

/// Named in-memory stores, the first one being the primary
pub fn memory_stores(names: &[&str]) -> Vec<Arc<MemoryContentStore>> {
    names
        .iter()
        .map(|name| Arc::new(MemoryContentStore::new(name)))
        .collect()
}

pub fn as_stores(stores: &[Arc<MemoryContentStore>]) -> Vec<Arc<dyn ContentStore>> {
    stores
        .iter()
        .map(|store| Arc::clone(store) as Arc<dyn ContentStore>)
        .collect()
}
