//! Fixed-point token amounts.
//!
//! Amounts are represented as integers (u128) of raw units to avoid floating-point
//! errors. One whole token is `10^DECIMALS` raw units, matching the 18-decimal
//! precision of the governance token and the LP tokens staked in the farm.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Number of decimal places of every amount handled by the farm.
pub const DECIMALS: u32 = 18;

/// Raw units in one whole token.
pub const ONE_TOKEN: u128 = 10u128.pow(DECIMALS);

/// A token amount in raw units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Amount of `whole` tokens, or `None` if it does not fit in raw units.
    pub fn from_tokens(whole: u128) -> Option<Self> {
        whole.checked_mul(ONE_TOKEN).map(Self)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Lossy conversion to whole tokens, for reporting and approximate comparisons.
    pub fn as_tokens_f64(&self) -> f64 {
        self.0 as f64 / ONE_TOKEN as f64
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for TokenAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TokenAmount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl From<u128> for TokenAmount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / ONE_TOKEN;
        let frac = self.0 % ONE_TOKEN;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{:0>width$}", frac, width = DECIMALS as usize);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

/// Parses decimal token notation such as `"1000000"` or `"0.25"`.
impl FromStr for TokenAmount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypesError::InvalidAmount(s.to_string());
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > DECIMALS as usize
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_raw: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = DECIMALS as usize);
            padded.parse().map_err(|_| invalid())?
        };
        whole
            .checked_mul(ONE_TOKEN)
            .and_then(|w| w.checked_add(frac_raw))
            .map(Self)
            .ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_tokens_scales_by_decimals() {
        let a = TokenAmount::from_tokens(500_000).unwrap();
        assert_eq!(a.raw(), 500_000 * ONE_TOKEN);
        assert!(TokenAmount::from_tokens(u128::MAX).is_none());
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(TokenAmount::from_tokens(3).unwrap().to_string(), "3");
        assert_eq!(TokenAmount::new(ONE_TOKEN / 4).to_string(), "0.25");
        assert_eq!(TokenAmount::new(1).to_string(), "0.000000000000000001");
    }

    #[test]
    fn parse_decimal_notation() {
        assert_eq!("1000000".parse::<TokenAmount>().unwrap().raw(), 1_000_000 * ONE_TOKEN);
        assert_eq!("0.5".parse::<TokenAmount>().unwrap().raw(), ONE_TOKEN / 2);
        assert_eq!(".5".parse::<TokenAmount>().unwrap().raw(), ONE_TOKEN / 2);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<TokenAmount>().is_err());
        assert!(".".parse::<TokenAmount>().is_err());
        assert!("1.2.3".parse::<TokenAmount>().is_err());
        assert!("-1".parse::<TokenAmount>().is_err());
        assert!("0.0000000000000000001".parse::<TokenAmount>().is_err());
    }

    #[test]
    fn as_tokens_f64_is_close() {
        let a = TokenAmount::new(ONE_TOKEN * 3 / 2);
        assert!((a.as_tokens_f64() - 1.5).abs() < 1e-12);
    }
}
