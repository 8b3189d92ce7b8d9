//! Contract events observable by external watchers
//!
//! Events are immutable records emitted by successful operations only.
//! A failed call never produces one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use types::ids::{Address, TokenId};
use types::numeric::Amount;
use uuid::Uuid;

/// Principal changed hands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub previous_owner: Address,
    pub new_owner: Address,
}

/// Native currency received from any sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeDeposit {
    pub sender: Address,
    pub amount: Amount,
}

/// Full native balance sent out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeWithdrawal {
    pub recipient: Address,
    pub amount: Amount,
}

/// Token amount moved out of the custody holding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenWithdrawal {
    pub token: TokenId,
    pub recipient: Address,
    pub amount: Amount,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustodyEvent {
    OwnershipTransferred(OwnershipTransferred),
    OperationPaused,
    OperationResumed,
    NativeDeposit(NativeDeposit),
    NativeWithdrawal(NativeWithdrawal),
    TokenWithdrawal(TokenWithdrawal),
}

impl CustodyEvent {
    pub fn label(&self) -> &'static str {
        match self {
            CustodyEvent::OwnershipTransferred(_) => "OwnershipTransferred",
            CustodyEvent::OperationPaused => "OperationPaused",
            CustodyEvent::OperationResumed => "OperationResumed",
            CustodyEvent::NativeDeposit(_) => "NativeDeposit",
            CustodyEvent::NativeWithdrawal(_) => "NativeWithdrawal",
            CustodyEvent::TokenWithdrawal(_) => "TokenWithdrawal",
        }
    }
}

/// An event as stored in the vault's append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Gapless, starts at 1
    pub sequence: u64,
    pub id: Uuid,
    pub emitted_at: DateTime<Utc>,
    pub event: CustodyEvent,
}

impl EventRecord {
    pub fn new(sequence: u64, event: CustodyEvent) -> Self {
        Self {
            sequence,
            id: Uuid::now_v7(),
            emitted_at: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_withdrawal_serialization() {
        let event = CustodyEvent::TokenWithdrawal(TokenWithdrawal {
            token: TokenId::new(Address::repeat(0x70)),
            recipient: Address::repeat(0xbb),
            amount: Amount::new(500),
        });
        let json = serde_json::to_string(&event).unwrap();
        let deser: CustodyEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_unit_events_serialize_by_name() {
        let json = serde_json::to_string(&CustodyEvent::OperationPaused).unwrap();
        assert_eq!(json, "\"OperationPaused\"");
    }

    #[test]
    fn test_labels() {
        let event = CustodyEvent::NativeDeposit(NativeDeposit {
            sender: Address::repeat(0xaa),
            amount: Amount::new(1),
        });
        assert_eq!(event.label(), "NativeDeposit");
        assert_eq!(CustodyEvent::OperationResumed.label(), "OperationResumed");
    }

    #[test]
    fn test_record_ids_are_unique() {
        let a = EventRecord::new(1, CustodyEvent::OperationPaused);
        let b = EventRecord::new(2, CustodyEvent::OperationResumed);
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.get_version_num(), 7);
    }
}
