//! Domain primitives: Address, Asset, BlockNumber and U256 helpers.

use primitive_types::{H160, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 160-bit account or contract address.
pub type Address = H160;

/// Block height of the chain.
pub type BlockNumber = u64;

/// Errors raised while parsing user supplied addresses and amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("invalid amount: {0}")]
    Amount(String),
}

/// Parse a `0x`-prefixed (or bare) 40 hex digit address.
pub fn parse_address(s: &str) -> Result<Address, ParseError> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if digits.len() != 40 {
        return Err(ParseError::Address(s.to_string()));
    }
    let bytes = hex::decode(digits).map_err(|_| ParseError::Address(s.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

/// Parse an amount either as a decimal string or as a `0x` hex quantity.
pub fn parse_amount(s: &str) -> Result<U256, ParseError> {
    let trimmed = s.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex_digits) => U256::from_str_radix(hex_digits, 16).ok(),
        None => U256::from_dec_str(trimmed).ok(),
    };
    parsed.ok_or_else(|| ParseError::Amount(s.to_string()))
}

/// Asset identifier: address-zero is ether, anything else is a token contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Asset(pub Address);

impl Asset {
    /// The native settlement currency.
    pub const ETHER: Asset = Asset(H160([0u8; 20]));

    pub fn token(address: Address) -> Self {
        Asset(address)
    }

    pub fn is_ether(&self) -> bool {
        self.0.is_zero()
    }

    pub fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for Asset {
    fn from(address: Address) -> Self {
        Asset(address)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ether() {
            write!(f, "ether")
        } else {
            write!(f, "{:?}", self.0)
        }
    }
}

impl FromStr for Asset {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ether" | "eth" | "0" => Ok(Asset::ETHER),
            other => parse_address(other).map(Asset),
        }
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Asset::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter writing U256 as a decimal string and reading decimal or hex.
pub mod u256_dec {
    use super::parse_amount;
    use primitive_types::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => parse_amount(&s).map_err(serde::de::Error::custom),
            Raw::Number(n) => Ok(U256::from(n)),
        }
    }
}

/// Big-endian 32 byte encoding of a 256-bit word.
pub fn u256_to_be_bytes(value: &U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_with_and_without_prefix() {
        let a = parse_address("0x00000000000000000000000000000000000000ff").unwrap();
        let b = parse_address("00000000000000000000000000000000000000ff").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_bytes()[19], 0xff);
    }

    #[test]
    fn test_parse_address_rejects_short_input() {
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0xzz00000000000000000000000000000000000000").is_err());
    }

    #[test]
    fn test_parse_amount_decimal_and_hex() {
        assert_eq!(parse_amount("1000").unwrap(), U256::from(1000u64));
        assert_eq!(parse_amount("0x3e8").unwrap(), U256::from(1000u64));
        assert!(parse_amount("-1").is_err());
    }

    #[test]
    fn test_asset_ether_sentinel() {
        assert!(Asset::ETHER.is_ether());
        assert_eq!(Asset::ETHER.to_string(), "ether");
        assert_eq!(Asset::from_str("0").unwrap(), Asset::ETHER);
        assert_eq!(
            Asset::from_str("0x0000000000000000000000000000000000000000").unwrap(),
            Asset::ETHER
        );
    }

    #[test]
    fn test_u256_dec_roundtrip_through_json() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "u256_dec")]
            amount: U256,
        }

        let json = serde_json::to_string(&Wrapper {
            amount: U256::exp10(18),
        })
        .unwrap();
        assert_eq!(json, r#"{"amount":"1000000000000000000"}"#);

        let parsed: Wrapper = serde_json::from_str(r#"{"amount":42}"#).unwrap();
        assert_eq!(parsed.amount, U256::from(42u64));
    }

    #[test]
    fn test_u256_to_be_bytes() {
        let bytes = u256_to_be_bytes(&U256::from(0x0102u64));
        assert_eq!(bytes[30], 0x01);
        assert_eq!(bytes[31], 0x02);
        assert!(bytes[..30].iter().all(|b| *b == 0));
    }
}
