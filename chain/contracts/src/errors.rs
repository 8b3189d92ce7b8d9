//! Contract-specific error types
//!
//! Every failure is distinguishable by kind so callers can react
//! differently (resume before retrying, lower the requested amount, ...).

use thiserror::Error;
use types::ids::{Address, TokenId};
use types::numeric::Amount;

/// Custody core errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("Unauthorized: {caller} is not the owner")]
    Unauthorized { caller: Address },

    #[error("Operation is already halted")]
    AlreadyHalted,

    #[error("Operation is not halted")]
    NotHalted,

    #[error("Operation is halted")]
    Halted,

    #[error("Native balance is zero")]
    ZeroBalance,

    #[error("Insufficient balance of token {token}: available {available}, requested {requested}")]
    InsufficientBalance {
        token: TokenId,
        available: Amount,
        requested: Amount,
    },

    #[error("Transfer rejected: {reason}")]
    TransferRejected { reason: TransferFailure },

    #[error("Zero address cannot become the owner")]
    ZeroAddress,

    #[error("Reentrancy detected")]
    Reentrancy,

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

impl CustodyError {
    /// Stable label for logs and tooling.
    pub fn kind(&self) -> &'static str {
        match self {
            CustodyError::Unauthorized { .. } => "unauthorized",
            CustodyError::AlreadyHalted => "already_halted",
            CustodyError::NotHalted => "not_halted",
            CustodyError::Halted => "halted",
            CustodyError::ZeroBalance => "zero_balance",
            CustodyError::InsufficientBalance { .. } => "insufficient_balance",
            CustodyError::TransferRejected { .. } => "transfer_rejected",
            CustodyError::ZeroAddress => "zero_address",
            CustodyError::Reentrancy => "reentrancy",
            CustodyError::Overflow => "overflow",
        }
    }
}

/// Failure reported by an external transfer primitive (native or ledger).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferFailure {
    #[error("recipient {recipient} cannot accept the transfer")]
    Rejected { recipient: Address },

    #[error("unknown token ledger {token}")]
    UnknownToken { token: TokenId },

    #[error("holder {holder} has {available}, needs {required}")]
    InsufficientFunds {
        holder: Address,
        available: Amount,
        required: Amount,
    },

    #[error("recipient balance would overflow")]
    Overflow,
}

impl From<TransferFailure> for CustodyError {
    fn from(reason: TransferFailure) -> Self {
        CustodyError::TransferRejected { reason }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {reason}")]
    Invalid { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_display() {
        let err = CustodyError::InsufficientBalance {
            token: TokenId::new(Address::repeat(0x70)),
            available: Amount::new(500),
            requested: Amount::new(1000),
        };
        let msg = err.to_string();
        assert!(msg.contains("available 500"));
        assert!(msg.contains("requested 1000"));
    }

    #[test]
    fn test_unauthorized_display_names_caller() {
        let err = CustodyError::Unauthorized {
            caller: Address::repeat(0xee),
        };
        assert!(err.to_string().contains(&Address::repeat(0xee).to_string()));
    }

    #[test]
    fn test_transfer_failure_into_custody_error() {
        let failure = TransferFailure::Rejected {
            recipient: Address::repeat(1),
        };
        let err: CustodyError = failure.clone().into();
        assert_eq!(err, CustodyError::TransferRejected { reason: failure });
        assert_eq!(err.kind(), "transfer_rejected");
    }

    #[test]
    fn test_kinds_are_distinct() {
        let errors = [
            CustodyError::Unauthorized { caller: Address::ZERO },
            CustodyError::AlreadyHalted,
            CustodyError::NotHalted,
            CustodyError::Halted,
            CustodyError::ZeroBalance,
            CustodyError::ZeroAddress,
            CustodyError::Reentrancy,
            CustodyError::Overflow,
        ];
        let kinds: std::collections::HashSet<_> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), errors.len());
    }
}
