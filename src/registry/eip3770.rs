use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

use super::RegistryError;

/// Chain specific address, `<chain>:<address>` (EIP-3770), e.g.
/// `xdai:0x01c58A553F92A61Fd713e6006fa7D1d82044c389`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Eip3770Address {
    /// Chain short name
    pub chain_id: String,
    /// Address on that chain, as written
    pub address: String,
}

impl Eip3770Address {
    /// Parse the address part
    pub fn to_address(&self) -> Result<Address, RegistryError> {
        parse_address(&self.address)
    }

    /// Numeric chain id of the short name, when known
    pub fn numeric_chain_id(&self) -> Option<u64> {
        known_chain_id(&self.chain_id)
    }
}

impl Display for Eip3770Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&format_eip3770_address(&self.chain_id, &self.address))
    }
}

/// Split at the first `:`
pub fn parse_eip3770_address(input: &str) -> Result<Eip3770Address, RegistryError> {
    let (chain_id, address) = input.split_once(':').ok_or_else(|| RegistryError::InvalidAddress {
        input: input.to_string(),
        reason: "invalid EIP-3770 address, no ':'".to_string(),
    })?;
    Ok(Eip3770Address {
        chain_id: chain_id.to_string(),
        address: address.to_string(),
    })
}

/// Inverse of [`parse_eip3770_address`]
pub fn format_eip3770_address(chain_id: &str, address: &str) -> String {
    format!("{chain_id}:{address}")
}

/// Numeric id of the chain short names registries are deployed on
pub fn known_chain_id(short_name: &str) -> Option<u64> {
    match short_name {
        "eth" => Some(1),
        "xdai" | "gno" => Some(100),
        _ => None,
    }
}

/// Parse a hex address, checksummed or not
pub fn parse_address(input: &str) -> Result<Address, RegistryError> {
    input
        .trim()
        .parse::<Address>()
        .map_err(|err| RegistryError::InvalidAddress {
            input: input.to_string(),
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn registry_address() {
        let parsed =
            parse_eip3770_address("xdai:0x01c58A553F92A61Fd713e6006fa7D1d82044c389").unwrap();
        assert_eq!(parsed.chain_id, "xdai");
        assert_eq!(parsed.numeric_chain_id(), Some(100));
        assert_eq!(
            parsed.to_address().unwrap().to_string(),
            "0x01c58A553F92A61Fd713e6006fa7D1d82044c389"
        );
    }

    #[test]
    fn missing_separator() {
        assert!(matches!(
            parse_eip3770_address("0x01c58A553F92A61Fd713e6006fa7D1d82044c389"),
            Err(RegistryError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn address_may_contain_colons() {
        let parsed = parse_eip3770_address("eth:a:b").unwrap();
        assert_eq!(parsed.chain_id, "eth");
        assert_eq!(parsed.address, "a:b");
    }

    proptest! {
        #[test]
        fn format_then_parse(chain_id in "[^:]+", address in ".+") {
            let parsed = parse_eip3770_address(&format_eip3770_address(&chain_id, &address)).unwrap();
            prop_assert_eq!(parsed.chain_id, chain_id);
            prop_assert_eq!(parsed.address, address);
        }
    }
}
