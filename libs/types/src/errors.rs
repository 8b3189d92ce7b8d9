//! Error types for identity and amount parsing
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Address parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAddressError {
    #[error("Address must start with 0x: {input}")]
    MissingPrefix { input: String },

    #[error("Address must be 40 hex digits, got {len}")]
    InvalidLength { len: usize },

    #[error("Address contains non-hex characters: {input}")]
    InvalidHex { input: String },
}

/// Amount arithmetic and conversion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {value}")]
    Negative { value: String },

    #[error("Amount {value} has more than {decimals} decimal places")]
    ExcessPrecision { value: String, decimals: u32 },

    #[error("Amount overflow")]
    Overflow,

    #[error("Invalid amount literal: {input}")]
    InvalidLiteral { input: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_error_display() {
        let err = ParseAddressError::InvalidLength { len: 12 };
        assert_eq!(err.to_string(), "Address must be 40 hex digits, got 12");
    }

    #[test]
    fn test_amount_error_display() {
        let err = AmountError::ExcessPrecision {
            value: "1.0000001".to_string(),
            decimals: 6,
        };
        assert!(err.to_string().contains("6 decimal places"));
    }
}
