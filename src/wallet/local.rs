use alloy_primitives::{Address, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{Wallet, WalletError, WalletEvent, EVENT_CAPACITY};
use crate::chain::TransactionRequest;

/// A wallet backed by a private key held in memory.
///
/// It signs messages but has no provider to broadcast through.
#[derive(Debug)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
    chain_id: u64,
    events: broadcast::Sender<WalletEvent>,
}

impl LocalWallet {
    /// Wrap an existing signer
    pub fn new(signer: PrivateKeySigner, chain_id: u64) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            signer,
            chain_id,
            events,
        }
    }

    /// Parse a hex private key, with or without `0x`
    pub fn from_private_key(key: &str, chain_id: u64) -> Result<Self, WalletError> {
        let signer = key
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|err| WalletError::Signer(alloy_signer::Error::other(err)))?;
        Ok(Self::new(signer, chain_id))
    }

    /// A throwaway key
    pub fn random(chain_id: u64) -> Self {
        Self::new(PrivateKeySigner::random(), chain_id)
    }

    /// Address of the key
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

#[async_trait]
impl Wallet for LocalWallet {
    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.signer.address()])
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.chain_id)
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, WalletError> {
        let signature = self.signer.sign_message(message).await?;
        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }

    async fn send_transaction(&self, _tx: &TransactionRequest) -> Result<B256, WalletError> {
        Err(WalletError::Unsupported("sending transactions"))
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::PrimitiveSignature;

    // Well known development key (hardhat account #0)
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn signature_recovers_to_account() {
        let wallet = LocalWallet::from_private_key(KEY, 1).unwrap();
        let message = b"QmRhdmquYoiMR5GB2dKqhLipMzdFUeyZ2eSVvTLDvndTvh";

        let signature = wallet.sign_message(message).await.unwrap();
        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 2 + 65 * 2);

        let bytes = hex::decode(&signature[2..]).unwrap();
        let parsed = PrimitiveSignature::try_from(bytes.as_slice()).unwrap();
        let signer = parsed.recover_address_from_msg(message).unwrap();
        assert_eq!(signer, wallet.address());
        assert_eq!(
            wallet.address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[tokio::test]
    async fn cannot_send() {
        let wallet = LocalWallet::random(1);
        let tx = TransactionRequest::new(Address::ZERO, vec![]);
        assert!(matches!(
            wallet.send_transaction(&tx).await,
            Err(WalletError::Unsupported(_))
        ));
    }

    #[test]
    fn bad_key() {
        assert!(LocalWallet::from_private_key("0x1234", 1).is_err());
    }
}
