//! Identity types for custody participants
//!
//! Addresses are 20-byte account identifiers rendered as lowercase
//! `0x`-prefixed hex. Token ledgers are identified by the address of the
//! ledger itself, wrapped in [`TokenId`] so the two never mix.

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::errors::ParseAddressError;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Account address of a caller, recipient, or contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The null address. Never a valid principal unless explicitly allowed.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Create from raw bytes
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Address owned by an ed25519 key: the last 20 bytes of SHA-256(key).
    pub fn from_public_key(key: &VerifyingKey) -> Self {
        let digest = Sha256::digest(key.as_bytes());
        Self::from_digest_tail(&digest)
    }

    /// Deterministic address of a component deployed by `deployer` at `nonce`.
    ///
    /// Two deployments by the same deployer never collide as long as the
    /// nonce increases.
    pub fn derive(deployer: &Address, nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"custody/deploy");
        hasher.update(deployer.as_bytes());
        hasher.update(nonce.to_be_bytes());
        Self::from_digest_tail(&hasher.finalize())
    }

    /// Short, human friendly address used in fixtures and logs.
    ///
    /// Fills every byte with `tag`, e.g. `Address::repeat(0xaa)`.
    pub const fn repeat(tag: u8) -> Self {
        Self([tag; ADDRESS_LEN])
    }

    fn from_digest_tail(digest: &[u8]) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[digest.len() - ADDRESS_LEN..]);
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| ParseAddressError::MissingPrefix {
                input: s.to_string(),
            })?;

        if digits.len() != ADDRESS_LEN * 2 {
            return Err(ParseAddressError::InvalidLength { len: digits.len() });
        }

        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| ParseAddressError::InvalidHex {
            input: s.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identity of one fungible-token ledger among many.
///
/// Opaque to the custody core: it is only ever handed back to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(Address);

impl TokenId {
    pub const fn new(ledger: Address) -> Self {
        Self(ledger)
    }

    /// Address of the ledger contract
    pub fn address(&self) -> &Address {
        &self.0
    }
}

impl From<Address> for TokenId {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TokenId {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}
