//! Account addresses and subaccount identifiers.
//!
//! Accounts are 20-byte addresses rendered as bech32 (`inj1...`). A
//! subaccount id is the account bytes followed by the subaccount index as a
//! 12-byte big-endian integer, hex encoded with a `0x` prefix.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Human-readable part of account addresses.
pub const ACCOUNT_HRP: &str = "inj";
const ACCOUNT_LEN: usize = 20;

/// Bech32 account address, kept in its original string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress {
    bech32: String,
    bytes: [u8; ACCOUNT_LEN],
}

impl AccountAddress {
    /// Parse and checksum-verify a bech32 account address.
    pub fn from_bech32(value: &str) -> Result<Self> {
        let invalid = |reason: String| CoreError::InvalidAddress(format!("{value}: {reason}"));

        let (hrp, payload) = bech32::decode(value).map_err(|e| invalid(e.to_string()))?;
        if !hrp.as_str().eq_ignore_ascii_case(ACCOUNT_HRP) {
            return Err(invalid(format!("expected prefix {ACCOUNT_HRP}, got {hrp}")));
        }
        let bytes: [u8; ACCOUNT_LEN] = payload
            .try_into()
            .map_err(|p: Vec<u8>| invalid(format!("expected 20 bytes, got {}", p.len())))?;

        Ok(Self {
            bech32: value.to_ascii_lowercase(),
            bytes,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.bech32
    }

    pub fn bytes(&self) -> &[u8; ACCOUNT_LEN] {
        &self.bytes
    }

    /// Derive the subaccount id for `index`.
    pub fn subaccount(&self, index: u32) -> SubaccountId {
        let mut raw = [0u8; 32];
        raw[..ACCOUNT_LEN].copy_from_slice(&self.bytes);
        raw[28..].copy_from_slice(&index.to_be_bytes());
        SubaccountId(format!("0x{}", hex::encode(raw)))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bech32)
    }
}

impl FromStr for AccountAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bech32(s)
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_bech32(&s)
    }
}

impl From<AccountAddress> for String {
    fn from(a: AccountAddress) -> Self {
        a.bech32
    }
}

/// Subaccount identifier (`0x` + 64 hex chars).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubaccountId(String);

impl SubaccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubaccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SubaccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "inj14au322k9munkmx5wrchz9q30juf5wjgz2cfqku";

    #[test]
    fn test_decode_known_address() {
        let address = AccountAddress::from_bech32(ADDRESS).unwrap();
        assert_eq!(
            hex::encode(address.bytes()),
            "af79152ac5df276d9a8e1e2e22822f9713474902"
        );
        assert_eq!(address.as_str(), ADDRESS);
    }

    #[test]
    fn test_subaccount_derivation() {
        let address = AccountAddress::from_bech32(ADDRESS).unwrap();
        assert_eq!(
            address.subaccount(0).as_str(),
            "0xaf79152ac5df276d9a8e1e2e22822f9713474902000000000000000000000000"
        );
        assert_eq!(
            address.subaccount(1).as_str(),
            "0xaf79152ac5df276d9a8e1e2e22822f9713474902000000000000000000000001"
        );
    }

    #[test]
    fn test_uppercase_address_is_accepted() {
        let address = AccountAddress::from_bech32(&ADDRESS.to_ascii_uppercase()).unwrap();
        assert_eq!(address.as_str(), ADDRESS);
    }

    #[test]
    fn test_rejects_bad_checksum() {
        let mut corrupted = ADDRESS.to_string();
        corrupted.pop();
        corrupted.push('q');
        assert!(AccountAddress::from_bech32(&corrupted).is_err());
    }

    #[test]
    fn test_rejects_foreign_prefix() {
        let bytes = AccountAddress::from_bech32(ADDRESS).unwrap().bytes().to_vec();
        let cosmos =
            bech32::encode::<bech32::Bech32>(bech32::Hrp::parse("cosmos").unwrap(), &bytes)
                .unwrap();
        let err = AccountAddress::from_bech32(&cosmos).unwrap_err();
        assert!(err.to_string().contains("expected prefix inj"));
    }

    #[test]
    fn test_rejects_mixed_case() {
        let mixed = format!("INJ{}", &ADDRESS[3..]);
        assert!(AccountAddress::from_bech32(&mixed).is_err());
    }

    #[test]
    fn test_rejects_non_bech32() {
        assert!(AccountAddress::from_bech32("granterPublicAddress").is_err());
        assert!(AccountAddress::from_bech32("").is_err());
        assert!(AccountAddress::from_bech32("inj1bio").is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let address = AccountAddress::from_bech32(ADDRESS).unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{ADDRESS}\""));
        let back: AccountAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
