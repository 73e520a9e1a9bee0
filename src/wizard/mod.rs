//! The publishing wizard as a finite-state machine.
//!
//! Steps advance in order, each with a way back to the previous one. All state lives
//! in a [`PublishSession`] and [`transition`] is pure: the side effects (signing,
//! sending the transaction) happen outside and are reported back as events.

mod error;
mod session;

pub use error::WizardError;
pub use session::{PublishSession, ReleaseDraft};

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use url::Url;

use crate::wallet::WalletEvent;

/// Wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WizardStep {
    /// Explains what is about to happen
    Introduction,
    /// Waiting for a wallet
    ConnectWallet,
    /// IPFS API and gateway selection
    IpfsSettings,
    /// Package name, version, developer and release hash
    ReleaseForm,
    /// Sign the release, then send the publish transaction
    SignAndPublish,
    /// Transaction sent
    Published,
}

impl WizardStep {
    /// The step a back-edge leads to
    pub fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Introduction => None,
            WizardStep::ConnectWallet => Some(WizardStep::Introduction),
            WizardStep::IpfsSettings => Some(WizardStep::ConnectWallet),
            WizardStep::ReleaseForm => Some(WizardStep::IpfsSettings),
            WizardStep::SignAndPublish => Some(WizardStep::ReleaseForm),
            WizardStep::Published => Some(WizardStep::SignAndPublish),
        }
    }
}

impl Display for WizardStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WizardStep::Introduction => "introduction",
            WizardStep::ConnectWallet => "wallet connection",
            WizardStep::IpfsSettings => "IPFS settings",
            WizardStep::ReleaseForm => "release details",
            WizardStep::SignAndPublish => "sign and publish",
            WizardStep::Published => "published",
        })
    }
}

/// Something that happened while the wizard was open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    /// Leave the introduction
    Start,
    /// A wallet exposed an account
    WalletConnected {
        /// Active account
        account: Address,
        /// Selected network
        chain_id: u64,
    },
    /// The wallet reported a change
    Wallet(WalletEvent),
    /// IPFS settings confirmed
    IpfsConfigured {
        /// APIs, primary first
        api_urls: Vec<String>,
        /// Manifest gateway
        gateway_url: String,
    },
    /// Release form submitted
    ReleaseSubmitted(ReleaseDraft),
    /// The release was signed, producing this CID
    ReleaseSigned(String),
    /// The publish transaction was sent
    TransactionSent(B256),
    /// Go back one step
    Back,
    /// Start over with the same settings
    Restart,
}

impl WizardEvent {
    fn name(&self) -> &'static str {
        match self {
            WizardEvent::Start => "start",
            WizardEvent::WalletConnected { .. } => "connect a wallet",
            WizardEvent::Wallet(_) => "handle wallet events",
            WizardEvent::IpfsConfigured { .. } => "configure IPFS",
            WizardEvent::ReleaseSubmitted(_) => "submit the release",
            WizardEvent::ReleaseSigned(_) => "record a signature",
            WizardEvent::TransactionSent(_) => "record a transaction",
            WizardEvent::Back => "go back",
            WizardEvent::Restart => "restart",
        }
    }
}

/// Apply `event` to `session`, returning the updated session
pub fn transition(
    mut session: PublishSession,
    event: WizardEvent,
) -> Result<PublishSession, WizardError> {
    let invalid = |session: &PublishSession, event: &WizardEvent| WizardError::InvalidTransition {
        step: session.step,
        event: event.name(),
    };

    match (session.step, event) {
        (WizardStep::Introduction, WizardEvent::Start) => {
            session.step = if session.account.is_some() {
                WizardStep::IpfsSettings
            } else {
                WizardStep::ConnectWallet
            };
        }

        (_, WizardEvent::WalletConnected { account, chain_id }) => {
            session.account = Some(account);
            session.chain_id = Some(chain_id);
            if session.step == WizardStep::ConnectWallet {
                session.step = WizardStep::IpfsSettings;
            }
        }

        (step, WizardEvent::Wallet(WalletEvent::AccountsChanged(accounts))) => {
            session.account = accounts.first().copied();
            // Losing the account mid-way sends the user back to connect one
            if session.account.is_none()
                && step > WizardStep::ConnectWallet
                && step < WizardStep::Published
            {
                session.step = WizardStep::ConnectWallet;
            }
        }

        (_, WizardEvent::Wallet(WalletEvent::ChainChanged(chain_id))) => {
            session.chain_id = Some(chain_id);
        }

        (WizardStep::IpfsSettings, WizardEvent::IpfsConfigured { api_urls, gateway_url }) => {
            let mut errors = Vec::new();
            if api_urls.is_empty() {
                errors.push("At least one IPFS API URL is required".to_string());
            }
            for url in api_urls.iter().chain(std::iter::once(&gateway_url)) {
                if Url::parse(url).is_err() {
                    errors.push(format!("Invalid URL {url}"));
                }
            }
            if !errors.is_empty() {
                return Err(WizardError::Validation(errors));
            }
            session.ipfs_api_urls = api_urls;
            session.ipfs_gateway_url = gateway_url;
            session.step = WizardStep::ReleaseForm;
        }

        (WizardStep::ReleaseForm, WizardEvent::ReleaseSubmitted(draft)) => {
            let errors = draft.validation_errors();
            if !errors.is_empty() {
                return Err(WizardError::Validation(errors));
            }
            if session.account.is_none() {
                return Err(WizardError::NotConnected);
            }
            session.release = draft;
            session.signed_hash = None;
            session.tx_hash = None;
            session.step = WizardStep::SignAndPublish;
        }

        (WizardStep::SignAndPublish, WizardEvent::ReleaseSigned(hash)) => {
            session.signed_hash = Some(hash);
        }

        (WizardStep::SignAndPublish, event @ WizardEvent::TransactionSent(_))
            if session.signed_hash.is_none() =>
        {
            return Err(invalid(&session, &event));
        }

        (WizardStep::SignAndPublish, WizardEvent::TransactionSent(tx_hash)) => {
            session.tx_hash = Some(tx_hash);
            session.step = WizardStep::Published;
        }

        (step, WizardEvent::Back) => match step.previous() {
            Some(previous) => session.step = previous,
            None => return Err(invalid(&session, &WizardEvent::Back)),
        },

        (WizardStep::Published, WizardEvent::Restart) => {
            session.release = ReleaseDraft::default();
            session.signed_hash = None;
            session.tx_hash = None;
            session.step = WizardStep::Introduction;
        }

        (_, event) => return Err(invalid(&session, &event)),
    }
    Ok(session)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::GlobalConfig;
    use alloy_primitives::address;

    const ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    fn draft() -> ReleaseDraft {
        ReleaseDraft {
            dnp_name: "foo.public.dappnode.eth".to_string(),
            version: "1.0.0".to_string(),
            developer_address: String::new(),
            release_hash: "/ipfs/QmRhdmquYoiMR5GB2dKqhLipMzdFUeyZ2eSVvTLDvndTvh".to_string(),
        }
    }

    fn apply(session: PublishSession, events: Vec<WizardEvent>) -> PublishSession {
        events
            .into_iter()
            .try_fold(session, transition)
            .unwrap()
    }

    #[test]
    fn happy_path() {
        let session = apply(
            PublishSession::new(&GlobalConfig::default()),
            vec![
                WizardEvent::Start,
                WizardEvent::WalletConnected {
                    account: ACCOUNT,
                    chain_id: 1,
                },
                WizardEvent::IpfsConfigured {
                    api_urls: vec!["http://127.0.0.1:5001".to_string()],
                    gateway_url: "http://127.0.0.1:8080".to_string(),
                },
                WizardEvent::ReleaseSubmitted(draft()),
                WizardEvent::ReleaseSigned("QmSigned".to_string()),
                WizardEvent::TransactionSent(B256::repeat_byte(1)),
            ],
        );
        assert_eq!(session.step, WizardStep::Published);
        assert_eq!(session.tx_hash, Some(B256::repeat_byte(1)));
        assert_eq!(session.ipfs_api_urls, vec!["http://127.0.0.1:5001"]);
    }

    #[test]
    fn every_step_but_the_first_goes_back() {
        assert_eq!(WizardStep::Introduction.previous(), None);
        let mut session = PublishSession::new(&GlobalConfig::default());
        session.step = WizardStep::Published;
        let mut visited = vec![session.step];
        while session.step != WizardStep::Introduction {
            session = transition(session, WizardEvent::Back).unwrap();
            visited.push(session.step);
        }
        assert_eq!(visited.len(), 6);
        assert!(transition(session, WizardEvent::Back).is_err());
    }

    #[test]
    fn invalid_form_stays_put() {
        let mut session = PublishSession::new(&GlobalConfig::default());
        session.step = WizardStep::ReleaseForm;
        session.account = Some(ACCOUNT);
        let mut bad = draft();
        bad.version = "one".to_string();
        let err = transition(session.clone(), WizardEvent::ReleaseSubmitted(bad)).unwrap_err();
        assert_eq!(err, WizardError::Validation(vec!["Invalid semver".to_string()]));
    }

    #[test]
    fn cannot_publish_unsigned() {
        let mut session = PublishSession::new(&GlobalConfig::default());
        session.step = WizardStep::SignAndPublish;
        let err = transition(session, WizardEvent::TransactionSent(B256::ZERO)).unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition { step: WizardStep::SignAndPublish, .. }));
    }

    #[test]
    fn losing_the_account_returns_to_connect() {
        let mut session = PublishSession::new(&GlobalConfig::default());
        session.step = WizardStep::ReleaseForm;
        session.account = Some(ACCOUNT);
        let session = transition(session, WizardEvent::Wallet(WalletEvent::AccountsChanged(vec![]))).unwrap();
        assert_eq!(session.step, WizardStep::ConnectWallet);
        assert_eq!(session.account, None);
    }

    #[test]
    fn out_of_order_events_are_rejected() {
        let session = PublishSession::new(&GlobalConfig::default());
        assert!(transition(session, WizardEvent::ReleaseSubmitted(draft())).is_err());
    }
}
