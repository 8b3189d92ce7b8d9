//! Native currency transfer primitive
//!
//! The custody core never moves native currency itself: it asks a
//! [`NativeTransfer`] implementation to send, and treats anything other
//! than an explicit `Ok` as a failed transfer.

use std::collections::{HashMap, HashSet};
use types::ids::Address;
use types::numeric::Amount;

use crate::errors::TransferFailure;

/// Send native currency to an address.
///
/// Implementations must report failure rather than silently losing funds
/// when the recipient cannot receive.
pub trait NativeTransfer {
    fn send(&mut self, to: &Address, amount: Amount) -> Result<(), TransferFailure>;
}

/// In-memory native currency accounting for every address outside the
/// custody core.
///
/// Addresses marked as rejecting behave like contracts without a receive
/// capability: any transfer to them fails and leaves balances untouched.
#[derive(Debug, Clone, Default)]
pub struct NativeBank {
    balances: HashMap<Address, Amount>,
    rejecting: HashSet<Address>,
}

impl NativeBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an external address.
    pub fn balance_of(&self, address: &Address) -> Amount {
        self.balances.get(address).copied().unwrap_or(Amount::ZERO)
    }

    /// Give an address funds out of thin air (genesis / faucet).
    pub fn credit(&mut self, address: Address, amount: Amount) -> Result<(), TransferFailure> {
        let current = self.balances.entry(address).or_insert(Amount::ZERO);
        *current = current
            .checked_add(amount)
            .ok_or(TransferFailure::Overflow)?;
        Ok(())
    }

    /// Take funds from an address, e.g. to pay a deposit into custody.
    pub fn debit(&mut self, address: &Address, amount: Amount) -> Result<(), TransferFailure> {
        let available = self.balance_of(address);
        let remaining = available
            .checked_sub(amount)
            .ok_or(TransferFailure::InsufficientFunds {
                holder: *address,
                available,
                required: amount,
            })?;
        self.balances.insert(*address, remaining);
        Ok(())
    }

    /// Make `address` refuse every incoming transfer.
    pub fn mark_rejecting(&mut self, address: Address) {
        self.rejecting.insert(address);
    }

    pub fn accepts(&self, address: &Address) -> bool {
        !self.rejecting.contains(address)
    }

    /// Sum of all external balances.
    pub fn total(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(Amount::ZERO, |acc, amount| acc.checked_add(*amount))
    }
}

impl NativeTransfer for NativeBank {
    fn send(&mut self, to: &Address, amount: Amount) -> Result<(), TransferFailure> {
        if !self.accepts(to) {
            return Err(TransferFailure::Rejected { recipient: *to });
        }
        self.credit(*to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::repeat(0xa1);
    const CONTRACT: Address = Address::repeat(0xc0);

    #[test]
    fn test_send_credits_recipient() {
        let mut bank = NativeBank::new();
        bank.send(&ALICE, Amount::new(7)).unwrap();
        bank.send(&ALICE, Amount::new(3)).unwrap();
        assert_eq!(bank.balance_of(&ALICE), Amount::new(10));
    }

    #[test]
    fn test_send_to_rejecting_address_fails() {
        let mut bank = NativeBank::new();
        bank.mark_rejecting(CONTRACT);
        let result = bank.send(&CONTRACT, Amount::new(1));
        assert_eq!(result, Err(TransferFailure::Rejected { recipient: CONTRACT }));
        assert_eq!(bank.balance_of(&CONTRACT), Amount::ZERO);
    }

    #[test]
    fn test_debit_insufficient() {
        let mut bank = NativeBank::new();
        bank.credit(ALICE, Amount::new(5)).unwrap();
        let result = bank.debit(&ALICE, Amount::new(6));
        assert!(matches!(result, Err(TransferFailure::InsufficientFunds { .. })));
        assert_eq!(bank.balance_of(&ALICE), Amount::new(5));
    }

    #[test]
    fn test_credit_overflow() {
        let mut bank = NativeBank::new();
        bank.credit(ALICE, Amount::new(u128::MAX)).unwrap();
        assert_eq!(
            bank.credit(ALICE, Amount::new(1)),
            Err(TransferFailure::Overflow)
        );
    }

    #[test]
    fn test_total() {
        let mut bank = NativeBank::new();
        bank.credit(ALICE, Amount::new(5)).unwrap();
        bank.credit(CONTRACT, Amount::new(6)).unwrap();
        assert_eq!(bank.total(), Some(Amount::new(11)));
    }
}
