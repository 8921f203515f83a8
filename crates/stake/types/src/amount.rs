//! Native value amounts
//!
//! Amounts are integers in the ledger's smallest denomination. One whole
//! unit is [`UNIT_DECIMALS`] decimal places of base units, so "0.5" parses
//! to half of [`Amount::UNIT`].
//!
//! On the wire an amount is a decimal string of base units, so values past
//! `u64` survive JSON and internally tagged enums.

use crate::{StakeError, StakeResult};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Decimal places between a whole unit and the base denomination
pub const UNIT_DECIMALS: u32 = 18;

/// Native value amount in base units
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(pub u128);

impl Amount {
    /// One whole unit
    pub const UNIT: Amount = Amount(10u128.pow(UNIT_DECIMALS));

    pub fn new(value: u128) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    /// `n` whole units
    pub fn units(n: u128) -> Self {
        Self(n.saturating_mul(Self::UNIT.0))
    }

    /// `n` thousandths of a unit
    pub fn milli(n: u128) -> Self {
        Self(n.saturating_mul(Self::UNIT.0 / 1_000))
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal unit string such as `"1"`, `"0.5"` or `"12.000001"`.
    pub fn parse_units(input: &str) -> StakeResult<Self> {
        let trimmed = input.trim();
        let invalid = || StakeError::InvalidAmount(input.to_string());

        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > UNIT_DECIMALS as usize {
            return Err(invalid());
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole_value: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_value: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = UNIT_DECIMALS as usize);
            padded.parse().map_err(|_| invalid())?
        };

        whole_value
            .checked_mul(Self::UNIT.0)
            .and_then(|w| w.checked_add(frac_value))
            .map(Self)
            .ok_or(StakeError::Overflow)
    }

    /// Render as a decimal unit string, trimming trailing zeros.
    pub fn to_units_string(&self) -> String {
        let whole = self.0 / Self::UNIT.0;
        let frac = self.0 % Self::UNIT.0;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{:0>width$}", frac, width = UNIT_DECIMALS as usize);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses base units, the inverse of `Display`
impl FromStr for Amount {
    type Err = StakeError;

    fn from_str(s: &str) -> StakeResult<Self> {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(StakeError::InvalidAmount(s.to_string()));
        }
        s.parse::<u128>().map(Self).map_err(|_| StakeError::Overflow)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string of base units")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount(u128::from(v)))
            }
        }

        deserializer.deserialize_str(AmountVisitor)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::zero(), Amount::saturating_add)
    }
}
