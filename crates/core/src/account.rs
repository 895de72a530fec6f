//! Canonical account form.
//!
//! Accounts arrive from hand-edited tables, CSV files and CLI flags in any
//! letter case, with or without `0x`, sometimes padded with whitespace. All of
//! them are parsed into the 20-byte address so equality is case-insensitive,
//! and rendered back in EIP-55 checksum form.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CoreError;

/// An EVM account in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Account(Address);

impl Account {
    /// Parse a raw table key or list entry into its canonical form.
    pub fn parse(raw: &str) -> crate::Result<Self> {
        let trimmed = raw.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidAccount(raw.to_string()));
        }
        Address::from_str(hex)
            .map(Self)
            .map_err(|_| CoreError::InvalidAccount(raw.to_string()))
    }

    pub fn address(&self) -> Address {
        self.0
    }

    /// EIP-55 checksum rendering.
    pub fn to_checksum(&self) -> String {
        self.0.to_checksum(None)
    }
}

impl From<Address> for Account {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl From<Account> for Address {
    fn from(account: Account) -> Self {
        account.0
    }
}

impl FromStr for Account {
    type Err = CoreError;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
