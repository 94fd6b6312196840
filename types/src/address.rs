//! Account and asset identifiers.
//!
//! Both are 20-byte hex addresses with a `0x` prefix: accounts are token holders
//! and stakers, assets are the LP tokens of the pools the farm supports.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PREFIX: &str = "0x";
const HEX_LEN: usize = 40;

fn validate(raw: &str) -> Result<(), TypesError> {
    let body = raw
        .strip_prefix(PREFIX)
        .ok_or_else(|| TypesError::InvalidAddress(raw.to_string()))?;
    if body.len() != HEX_LEN || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(TypesError::InvalidAddress(raw.to_string()));
    }
    Ok(())
}

/// An account that holds tokens and stakes LP.
///
/// Stored lower-cased so that differently-cased spellings compare equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account id from a raw string.
    ///
    /// # Panics
    /// Panics if the string is not a `0x`-prefixed 40-digit hex address.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(validate(&s).is_ok(), "account must be a 0x-prefixed hex address");
        Self(s.to_ascii_lowercase())
    }

    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        validate(raw)?;
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = TypesError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A stakeable asset: the LP token of a supported pool.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    /// Create an asset id from a raw string.
    ///
    /// # Panics
    /// Panics if the string is not a `0x`-prefixed 40-digit hex address.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(validate(&s).is_ok(), "asset must be a 0x-prefixed hex address");
        Self(s.to_ascii_lowercase())
    }

    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        validate(raw)?;
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssetId {
    type Err = TypesError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
