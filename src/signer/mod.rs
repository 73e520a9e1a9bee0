//! Detached release signatures.
//!
//! A release is an IPFS directory. Signing it adds a `signature.json` entry holding
//! an ECDSA signature over the listing of the other entries, which produces a new
//! directory CID while every existing file keeps its hash.

mod error;
mod replicate;
mod signature;

pub use error::SignerError;
pub use signature::{
    serialize_directory, ReleaseSignature, SignatureProtocol, SIGNATURE_FILE_NAME,
    SIGNATURE_FORMAT_VERSION,
};

use libipld::Cid;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    cid::{cid_at_version, parse_cid, CidFormat, CidVersion},
    ipfs::{ContentStore, DagLink, DagPutOptions, DirectoryEntry},
    wallet::Wallet,
};
use replicate::replicate;

/// Signs release directories with a wallet and writes the result to IPFS
#[derive(Debug)]
pub struct ReleaseSigner<W> {
    wallet: W,
    format: CidFormat,
}

impl<W: Wallet> ReleaseSigner<W> {
    /// Sign with `wallet`, rendering listed CIDs as v0 base58btc
    pub fn new(wallet: W) -> Self {
        Self {
            wallet,
            format: CidFormat::V0_BASE58BTC,
        }
    }

    /// Render listed CIDs in another format
    pub fn with_cid_format(mut self, format: CidFormat) -> Self {
        self.format = format;
        self
    }

    /// The wallet used for signing
    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Sign the release at `release` and return the CIDv0 of the signed directory.
    ///
    /// The first store is the primary: every read goes through it and its failures
    /// abort the operation. New objects are copied to the remaining stores, whose
    /// failures are only logged.
    pub async fn sign_release(
        &self,
        release: &str,
        stores: &[Arc<dyn ContentStore>],
    ) -> Result<String, SignerError> {
        let (primary, redundant) = stores.split_first().ok_or_else(|| {
            SignerError::Configuration("at least one IPFS API endpoint is required".to_string())
        })?;
        let release_cid = parse_cid(release)?;

        let entries = primary
            .list(&release_cid)
            .await
            .map_err(SignerError::ipfs(format!("Error listing release {release_cid}")))?;
        if entries.is_empty() {
            return Err(SignerError::EmptyRelease(release_cid.to_string()));
        }
        if entries.iter().any(|entry| entry.name == SIGNATURE_FILE_NAME) {
            return Err(SignerError::AlreadySigned(release_cid.to_string()));
        }

        let listing = serialize_directory(&entries, self.format)?;
        debug!("signing listing of {release_cid}:\n{listing}");
        let signature = self.wallet.sign_message(listing.as_bytes()).await?;
        let signature_json = ReleaseSignature::new(self.format, signature).to_json()?;

        let added = primary
            .add(signature_json.clone().into_bytes())
            .await
            .map_err(SignerError::ipfs(format!("Error adding {SIGNATURE_FILE_NAME}")))?;
        info!("stored {SIGNATURE_FILE_NAME} as {}", added.cid);
        replicate(redundant, "signature", |store| {
            let bytes = signature_json.clone().into_bytes();
            async move { store.add(bytes).await.map(|_| ()) }
        })
        .await;

        let mut root = primary
            .dag_get(&release_cid)
            .await
            .map_err(SignerError::ipfs(format!("Error getting release root {release_cid}")))?;
        root.add_link(DagLink::named(added.cid, SIGNATURE_FILE_NAME, added.size));
        root.sort_links();

        let options = DagPutOptions::default();
        let signed_cid = primary
            .dag_put(&root, options)
            .await
            .map_err(SignerError::ipfs("Error putting signed release root"))?;
        replicate(redundant, "signed release", |store| {
            let root = root.clone();
            async move { store.dag_put(&root, options).await.map(|_| ()) }
        })
        .await;

        self.verify(&**primary, &signed_cid, &entries).await?;

        let signed = cid_at_version(&signed_cid, CidVersion::V0)?.to_string();
        info!("signed release {release_cid} as {signed}");
        Ok(signed)
    }

    /// Check that the signed release lists the original names plus the signature
    async fn verify(
        &self,
        store: &dyn ContentStore,
        signed: &Cid,
        original: &[DirectoryEntry],
    ) -> Result<(), SignerError> {
        let mut expected: Vec<String> = original.iter().map(|entry| entry.name.clone()).collect();
        expected.push(SIGNATURE_FILE_NAME.to_string());
        expected.sort();

        let mut actual: Vec<String> = store
            .list(signed)
            .await
            .map_err(SignerError::ipfs(format!("Error listing signed release {signed}")))?
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        actual.sort();

        if actual == expected {
            Ok(())
        } else {
            Err(SignerError::Integrity { expected, actual })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ipfs::MemoryContentStore, wallet::LocalWallet};

    fn stores(stores: &[&Arc<MemoryContentStore>]) -> Vec<Arc<dyn ContentStore>> {
        stores
            .iter()
            .map(|store| Arc::clone(store) as Arc<dyn ContentStore>)
            .collect()
    }

    #[tokio::test]
    async fn no_endpoints() {
        let signer = ReleaseSigner::new(LocalWallet::random(1));
        let err = signer
            .sign_release("QmRhdmquYoiMR5GB2dKqhLipMzdFUeyZ2eSVvTLDvndTvh", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, SignerError::Configuration(_)));
    }

    #[tokio::test]
    async fn adds_signature_entry() {
        let primary = Arc::new(MemoryContentStore::new("primary"));
        let release = primary
            .put_directory(&[("manifest.json", b"{}"), ("image.png", b"png")])
            .await
            .unwrap();

        let signer = ReleaseSigner::new(LocalWallet::random(1));
        let signed = signer
            .sign_release(&format!("/ipfs/{release}"), &stores(&[&primary]))
            .await
            .unwrap();
        assert!(signed.starts_with("Qm"));

        let names: Vec<String> = primary
            .list(&parse_cid(&signed).unwrap())
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["image.png", "manifest.json", "signature.json"]);
    }

    #[tokio::test]
    async fn signature_file_content() {
        let primary = Arc::new(MemoryContentStore::new("primary"));
        let release = primary.put_directory(&[("a.txt", b"a")]).await.unwrap();
        let signer = ReleaseSigner::new(LocalWallet::random(1));
        let signed = signer
            .sign_release(&release.to_string(), &stores(&[&primary]))
            .await
            .unwrap();

        let signature = primary
            .list(&parse_cid(&signed).unwrap())
            .await
            .unwrap()
            .into_iter()
            .find(|entry| entry.name == SIGNATURE_FILE_NAME)
            .map(|entry| entry.cid);
        assert!(signature.is_some());
    }

    #[tokio::test]
    async fn primary_failure_names_the_step() {
        let primary = Arc::new(MemoryContentStore::new("primary"));
        let release = primary.put_directory(&[("a.txt", b"a")]).await.unwrap();
        primary.set_offline(true);

        let err = ReleaseSigner::new(LocalWallet::random(1))
            .sign_release(&release.to_string(), &stores(&[&primary]))
            .await
            .unwrap_err();
        assert!(matches!(err, SignerError::Ipfs { .. }));
        assert!(err
            .to_string()
            .starts_with(&format!("Error listing release {release}: ")));
    }
}
