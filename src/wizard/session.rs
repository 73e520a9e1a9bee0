use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::{WizardError, WizardStep};
use crate::{
    cid::{is_ipfs_hash, normalize_ipfs_path},
    config::GlobalConfig,
    registry::{parse_address, parse_semantic_version, PublishRequest},
};

/// Release fields as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDraft {
    /// Package name, `r` in URL queries
    pub dnp_name: String,
    /// Next version, `v`
    pub version: String,
    /// Developer for new repos, `d`; may be empty
    pub developer_address: String,
    /// Unsigned release hash, `h`
    pub release_hash: String,
}

impl ReleaseDraft {
    /// Every problem with the draft, empty when it can be signed and published
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.dnp_name.is_empty() {
            errors.push("dnpName must be defined".to_string());
        } else if !is_valid_ens(&self.dnp_name) {
            errors.push("Invalid ENS domain".to_string());
        }
        if !self.developer_address.is_empty() && parse_address(&self.developer_address).is_err() {
            errors.push("Must be a valid ethereum address".to_string());
        }
        if self.version.is_empty() {
            errors.push("version must be defined".to_string());
        } else if parse_semantic_version(&self.version).is_err() {
            errors.push("Invalid semver".to_string());
        }
        if self.release_hash.is_empty() {
            errors.push("releaseHash must be defined".to_string());
        } else if !is_ipfs_hash(&self.release_hash) {
            errors.push("Invalid ipfs hash".to_string());
        }
        errors
    }
}

fn is_valid_ens(name: &str) -> bool {
    name.split('.').count() >= 2
        && name.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        })
}

/// Everything the wizard has collected so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishSession {
    /// Current step
    pub step: WizardStep,
    /// Connected account
    pub account: Option<Address>,
    /// Network of the connected wallet
    pub chain_id: Option<u64>,
    /// IPFS APIs to write to, primary first
    pub ipfs_api_urls: Vec<String>,
    /// Gateway for reading manifests
    pub ipfs_gateway_url: String,
    /// The release being published
    pub release: ReleaseDraft,
    /// CID of the signed release
    pub signed_hash: Option<String>,
    /// Hash of the publish transaction
    pub tx_hash: Option<B256>,
}

impl PublishSession {
    /// A fresh session using the configured IPFS endpoints
    pub fn new(config: &GlobalConfig) -> Self {
        Self {
            step: WizardStep::Introduction,
            account: None,
            chain_id: None,
            ipfs_api_urls: config.ipfs_api_urls.clone(),
            ipfs_gateway_url: config.ipfs_gateway_url.clone(),
            release: ReleaseDraft::default(),
            signed_hash: None,
            tx_hash: None,
        }
    }

    /// Pre-fill the release from a query string such as
    /// `?r=timeapp.public.dappnode.eth&v=0.1.16&h=%2Fipfs%2FQm…`.
    ///
    /// When any of `r`, `v`, `d` or `h` is present the session starts at the IPFS
    /// settings step.
    pub fn from_url_query(query: &str, config: &GlobalConfig) -> Self {
        let mut session = Self::new(config);
        let mut prefilled = false;
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let field = match &*key {
                "r" => &mut session.release.dnp_name,
                "v" => &mut session.release.version,
                "d" => &mut session.release.developer_address,
                "h" => &mut session.release.release_hash,
                _ => continue,
            };
            if !value.is_empty() {
                *field = value.into_owned();
                prefilled = true;
            }
        }
        if prefilled {
            session.step = WizardStep::IpfsSettings;
        }
        session
    }

    /// Inverse of [`from_url_query`](Self::from_url_query) for the non-empty fields
    pub fn to_url_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in [
            ("r", &self.release.dnp_name),
            ("v", &self.release.version),
            ("d", &self.release.developer_address),
            ("h", &self.release.release_hash),
        ] {
            if !value.is_empty() {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }

    /// The publish request for the signed release
    pub fn publish_request(&self) -> Result<PublishRequest, WizardError> {
        let errors = self.release.validation_errors();
        if !errors.is_empty() {
            return Err(WizardError::Validation(errors));
        }
        let hash = self
            .signed_hash
            .as_deref()
            .unwrap_or(&self.release.release_hash);
        let developer_address = if self.release.developer_address.is_empty() {
            None
        } else {
            parse_address(&self.release.developer_address).ok()
        };
        Ok(PublishRequest {
            dnp_name: self.release.dnp_name.clone(),
            version: self.release.version.clone(),
            manifest_hash: format!("/ipfs/{}", normalize_ipfs_path(hash)),
            developer_address,
        })
    }
}
