//! Integer amounts in base units
//!
//! Every balance is an unsigned count of the smallest indivisible unit of
//! its asset (wei for the native currency, raw token units for ledgers).
//! Human-readable values go through rust_decimal with an explicit scale,
//! so `1.5` at 18 decimals is exactly `1_500_000_000_000_000_000`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::AmountError;

/// Largest scale rust_decimal can represent.
pub const MAX_DECIMALS: u32 = 28;

/// Non-negative amount in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn new(base_units: u128) -> Self {
        Self(base_units)
    }

    /// Raw base units
    pub const fn value(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Convert a decimal unit value (e.g. `1.5` ether) into base units.
    ///
    /// Rejects negative values and values with more fractional digits than
    /// the asset supports.
    pub fn from_units(value: Decimal, decimals: u32) -> Result<Self, AmountError> {
        if decimals > MAX_DECIMALS {
            return Err(AmountError::Overflow);
        }
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative {
                value: value.to_string(),
            });
        }

        let normalized = value.normalize();
        let scale = normalized.scale();
        if scale > decimals {
            return Err(AmountError::ExcessPrecision {
                value: value.to_string(),
                decimals,
            });
        }

        let mantissa = normalized.mantissa().unsigned_abs();
        let factor = 10u128
            .checked_pow(decimals - scale)
            .ok_or(AmountError::Overflow)?;
        mantissa
            .checked_mul(factor)
            .map(Amount)
            .ok_or(AmountError::Overflow)
    }

    /// Parse a decimal literal such as `"1.0"` at the given scale.
    pub fn parse_units(input: &str, decimals: u32) -> Result<Self, AmountError> {
        let value = Decimal::from_str_exact(input.trim()).map_err(|_| {
            AmountError::InvalidLiteral {
                input: input.to_string(),
            }
        })?;
        Self::from_units(value, decimals)
    }

    /// Express this amount in decimal units at the given scale.
    pub fn to_units(&self, decimals: u32) -> Result<Decimal, AmountError> {
        if decimals > MAX_DECIMALS {
            return Err(AmountError::Overflow);
        }
        let raw = i128::try_from(self.0).map_err(|_| AmountError::Overflow)?;
        Decimal::try_from_i128_with_scale(raw, decimals).map_err(|_| AmountError::Overflow)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value as u128)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u128>()
            .map(Amount)
            .map_err(|_| AmountError::InvalidLiteral {
                input: s.to_string(),
            })
    }
}

// Serialized as a decimal string: JSON numbers cannot carry u128 safely.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ETHER: u32 = 18;

    #[test]
    fn test_checked_arithmetic() {
        let a = Amount::new(500);
        assert_eq!(a.checked_add(Amount::new(500)), Some(Amount::new(1000)));
        assert_eq!(a.checked_sub(Amount::new(501)), None);
        assert_eq!(Amount::new(u128::MAX).checked_add(Amount::new(1)), None);
    }

    #[test]
    fn test_from_units_one_ether() {
        let wei = Amount::parse_units("1.0", ETHER).unwrap();
        assert_eq!(wei.value(), 1_000_000_000_000_000_000);
    }

    #[test]
    fn test_from_units_fractional() {
        let amount = Amount::parse_units("0.25", 6).unwrap();
        assert_eq!(amount, Amount::new(250_000));
    }

    #[test]
    fn test_from_units_rejects_negative() {
        let result = Amount::from_units(Decimal::from(-1), ETHER);
        assert!(matches!(result, Err(AmountError::Negative { .. })));
    }

    #[test]
    fn test_from_units_rejects_excess_precision() {
        let result = Amount::parse_units("0.0000001", 6);
        assert!(matches!(result, Err(AmountError::ExcessPrecision { .. })));
    }

    #[test]
    fn test_trailing_zeros_are_not_precision() {
        // 1.500000000 normalizes to 1.5
        let amount = Amount::parse_units("1.500000000", 2).unwrap();
        assert_eq!(amount, Amount::new(150));
    }

    #[test]
    fn test_parse_units_invalid_literal() {
        let result = Amount::parse_units("one", ETHER);
        assert!(matches!(result, Err(AmountError::InvalidLiteral { .. })));
    }

    #[test]
    fn test_to_units() {
        let amount = Amount::new(1_500_000_000_000_000_000);
        assert_eq!(
            amount.to_units(ETHER).unwrap(),
            Decimal::from_str_exact("1.5").unwrap()
        );
    }

    #[test]
    fn test_to_units_overflow() {
        assert_eq!(Amount::new(u128::MAX).to_units(0), Err(AmountError::Overflow));
        assert_eq!(Amount::new(1).to_units(29), Err(AmountError::Overflow));
    }

    #[test]
    fn test_serde_as_string() {
        let amount = Amount::new(u128::MAX);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, format!("\"{}\"", u128::MAX));
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }

    proptest! {
        /// Converting to units and back is lossless for any representable amount.
        #[test]
        fn fuzz_units_conversion_lossless(raw in 0u64..u64::MAX, decimals in 0u32..=18) {
            let amount = Amount::from(raw);
            let units = amount.to_units(decimals).unwrap();
            prop_assert_eq!(Amount::from_units(units, decimals).unwrap(), amount);
        }
    }
}
