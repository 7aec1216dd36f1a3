//! Core type definitions for the Hyperchain bridge module
//!
//! Identifiers that cross the host boundary (accounts, chains, coins) are
//! validated once at construction and are plain strings on the wire.

use crate::error::{HyperchainError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of an account identifier
pub const MAX_ADDRESS_LEN: usize = 90;

/// Maximum length of a chain identifier
pub const MAX_CHAIN_ID_LEN: usize = 128;

/// Address - account identifier in `hrp1data` form
///
/// The human readable part is lowercase ASCII letters, the data part is
/// lowercase ASCII alphanumerics. Checksums are the host's concern.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse and validate an account identifier
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(HyperchainError::InvalidAddress(s))
        }
    }

    /// Syntactic validity check
    pub fn is_valid(s: &str) -> bool {
        if s.is_empty() || s.len() > MAX_ADDRESS_LEN {
            return false;
        }
        let Some((hrp, data)) = s.split_once('1') else {
            return false;
        };
        !hrp.is_empty()
            && hrp.bytes().all(|b| b.is_ascii_lowercase())
            && !data.is_empty()
            && data
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    }

    /// Deterministic address of a module-owned account
    pub fn module(hrp: &str, module_name: &str) -> Self {
        let hash = blake3::hash(module_name.as_bytes());
        Self(format!("{}1{}", hrp, &hex::encode(hash.as_bytes())[..38]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = HyperchainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// ChainId - opaque name of a ledger participating in bridging
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.is_empty() {
            return Err(HyperchainError::InvalidArgument(
                "chain ID cannot be empty".to_string(),
            ));
        }
        if s.len() > MAX_CHAIN_ID_LEN || s.chars().any(char::is_control) {
            return Err(HyperchainError::InvalidArgument(format!(
                "invalid chain ID: {}",
                s
            )));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChainId {
    type Err = HyperchainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Quantity of a coin (non-negative)
pub type Amount = u128;

/// Coin - a denomination plus a non-negative integer quantity
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Amount,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: Amount) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Denominations: a letter followed by 2-127 of `[a-zA-Z0-9/:._-]`
    pub fn is_valid_denom(denom: &str) -> bool {
        let bytes = denom.as_bytes();
        (3..=128).contains(&bytes.len())
            && bytes[0].is_ascii_alphabetic()
            && bytes[1..]
                .iter()
                .all(|b| b.is_ascii_alphanumeric() || b"/:._-".contains(b))
    }

    pub fn validate(&self) -> Result<()> {
        if !Self::is_valid_denom(&self.denom) {
            return Err(HyperchainError::InvalidArgument(format!(
                "invalid denomination: {}",
                self.denom
            )));
        }
        Ok(())
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Debug for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coin({}{})", self.amount, self.denom)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = HyperchainError;

    /// Parse `"<amount><denom>"`, e.g. `100gold`
    fn from_str(s: &str) -> Result<Self> {
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| HyperchainError::InvalidArgument(format!("invalid coin: {}", s)))?;
        let (amount, denom) = s.split_at(split);
        let amount = amount
            .parse::<Amount>()
            .map_err(|_| HyperchainError::InvalidArgument(format!("invalid coin: {}", s)))?;
        let coin = Coin::new(denom, amount);
        coin.validate()?;
        Ok(coin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_validation() {
        assert!(Address::parse("nmx1alice").is_ok());
        assert!(Address::parse("nmx1r1").is_ok());
        assert!(Address::parse("alice").is_err());
        assert!(Address::parse("NMX1alice").is_err());
        assert!(Address::parse("nmx1").is_err());
        assert!(Address::parse("1alice").is_err());
        assert!(Address::parse("nmx1Alice").is_err());
        assert!(Address::parse("a".repeat(MAX_ADDRESS_LEN + 1)).is_err());
    }

    #[test]
    fn test_module_address_is_stable() {
        let a = Address::module("nmx", "hyperchain");
        let b = Address::module("nmx", "hyperchain");
        assert_eq!(a, b);
        assert!(Address::is_valid(a.as_str()));
        assert_ne!(a, Address::module("nmx", "bank"));
    }

    #[test]
    fn test_chain_id() {
        assert!(ChainId::parse("alpha").is_ok());
        assert!(ChainId::parse("").is_err());
        assert!(ChainId::parse("bad\0id").is_err());
    }

    #[test]
    fn test_coin_parse_and_display() {
        let coin: Coin = "100gold".parse().unwrap();
        assert_eq!(coin, Coin::new("gold", 100));
        assert_eq!(coin.to_string(), "100gold");

        assert!("gold".parse::<Coin>().is_err());
        assert!("100".parse::<Coin>().is_err());
        assert!("100g".parse::<Coin>().is_err());
    }

    #[test]
    fn test_denom_rules() {
        assert!(Coin::is_valid_denom("unmx"));
        assert!(Coin::is_valid_denom("ibc/ABC123"));
        assert!(!Coin::is_valid_denom("1abc"));
        assert!(!Coin::is_valid_denom("ab"));
    }

    proptest::proptest! {
        #[test]
        fn prop_coin_display_parses_back(
            amount in proptest::prelude::any::<u128>(),
            denom in "[a-zA-Z][a-zA-Z0-9/:._-]{2,20}",
        ) {
            let coin = Coin::new(denom, amount);
            let parsed: Coin = coin.to_string().parse().unwrap();
            proptest::prop_assert_eq!(parsed, coin);
        }
    }
}
