//! Fungible token ledger interface
//!
//! Token balances live entirely in the ledger; the custody core only asks
//! for its own balance and instructs transfers out of its holding.

use std::collections::{HashMap, HashSet};
use types::ids::{Address, TokenId};
use types::numeric::Amount;

use crate::errors::TransferFailure;

/// External ledger tracking per-holder balances for many tokens.
pub trait FungibleLedger {
    /// Balance of `holder` in `token`. Unknown tokens report zero.
    fn balance_of(&self, holder: &Address, token: &TokenId) -> Amount;

    /// Move `amount` of `token` from `from` to `to`, acting as `from`.
    ///
    /// Must leave every balance untouched when it returns an error.
    fn transfer(
        &mut self,
        token: &TokenId,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TransferFailure>;
}

#[derive(Debug, Clone, Default)]
struct TokenBook {
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
    frozen: HashSet<Address>,
}

impl TokenBook {
    fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(Amount::ZERO)
    }
}

/// In-memory multi-token ledger with mock-token minting.
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    tokens: HashMap<TokenId, TokenBook>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token with zero supply. Registering twice is a no-op.
    pub fn register(&mut self, token: TokenId) {
        self.tokens.entry(token).or_default();
    }

    pub fn is_registered(&self, token: &TokenId) -> bool {
        self.tokens.contains_key(token)
    }

    /// Create `amount` new units for `to`, registering the token if needed.
    pub fn mint(&mut self, token: TokenId, to: Address, amount: Amount) -> Result<(), TransferFailure> {
        let book = self.tokens.entry(token).or_default();
        let supply = book
            .total_supply
            .checked_add(amount)
            .ok_or(TransferFailure::Overflow)?;
        let balance = book
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(TransferFailure::Overflow)?;
        book.total_supply = supply;
        book.balances.insert(to, balance);
        Ok(())
    }

    pub fn total_supply(&self, token: &TokenId) -> Amount {
        self.tokens
            .get(token)
            .map(|book| book.total_supply)
            .unwrap_or(Amount::ZERO)
    }

    /// Make `holder` refuse incoming transfers of `token`.
    pub fn freeze(&mut self, token: TokenId, holder: Address) {
        self.tokens.entry(token).or_default().frozen.insert(holder);
    }

    /// Registered tokens in a stable order.
    pub fn tokens(&self) -> Vec<TokenId> {
        let mut tokens: Vec<TokenId> = self.tokens.keys().copied().collect();
        tokens.sort();
        tokens
    }
}

impl FungibleLedger for TokenLedger {
    fn balance_of(&self, holder: &Address, token: &TokenId) -> Amount {
        self.tokens
            .get(token)
            .map(|book| book.balance_of(holder))
            .unwrap_or(Amount::ZERO)
    }

    fn transfer(
        &mut self,
        token: &TokenId,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TransferFailure> {
        let book = self
            .tokens
            .get_mut(token)
            .ok_or(TransferFailure::UnknownToken { token: *token })?;

        if book.frozen.contains(to) {
            return Err(TransferFailure::Rejected { recipient: *to });
        }

        let available = book.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(TransferFailure::InsufficientFunds {
                holder: *from,
                available,
                required: amount,
            })?;

        if from == to {
            return Ok(());
        }

        let credited = book
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TransferFailure::Overflow)?;

        // Both sides computed before either is written.
        book.balances.insert(*from, debited);
        book.balances.insert(*to, credited);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: TokenId = TokenId::new(Address::repeat(0x70));
    const ALICE: Address = Address::repeat(0xa1);
    const BOB: Address = Address::repeat(0xb0);

    #[test]
    fn test_mint_and_balance() {
        let mut ledger = TokenLedger::new();
        ledger.mint(TOKEN, ALICE, Amount::new(1000)).unwrap();
        assert_eq!(ledger.balance_of(&ALICE, &TOKEN), Amount::new(1000));
        assert_eq!(ledger.total_supply(&TOKEN), Amount::new(1000));
        assert!(ledger.is_registered(&TOKEN));
    }

    #[test]
    fn test_unknown_token_balance_is_zero() {
        let ledger = TokenLedger::new();
        assert_eq!(ledger.balance_of(&ALICE, &TOKEN), Amount::ZERO);
    }

    #[test]
    fn test_transfer_moves_exact_amount() {
        let mut ledger = TokenLedger::new();
        ledger.mint(TOKEN, ALICE, Amount::new(1000)).unwrap();
        ledger.transfer(&TOKEN, &ALICE, &BOB, Amount::new(400)).unwrap();
        assert_eq!(ledger.balance_of(&ALICE, &TOKEN), Amount::new(600));
        assert_eq!(ledger.balance_of(&BOB, &TOKEN), Amount::new(400));
        assert_eq!(ledger.total_supply(&TOKEN), Amount::new(1000));
    }

    #[test]
    fn test_transfer_insufficient_leaves_balances() {
        let mut ledger = TokenLedger::new();
        ledger.mint(TOKEN, ALICE, Amount::new(10)).unwrap();
        let result = ledger.transfer(&TOKEN, &ALICE, &BOB, Amount::new(11));
        assert_eq!(
            result,
            Err(TransferFailure::InsufficientFunds {
                holder: ALICE,
                available: Amount::new(10),
                required: Amount::new(11),
            })
        );
        assert_eq!(ledger.balance_of(&ALICE, &TOKEN), Amount::new(10));
        assert_eq!(ledger.balance_of(&BOB, &TOKEN), Amount::ZERO);
    }

    #[test]
    fn test_transfer_unknown_token() {
        let mut ledger = TokenLedger::new();
        let result = ledger.transfer(&TOKEN, &ALICE, &BOB, Amount::ZERO);
        assert_eq!(result, Err(TransferFailure::UnknownToken { token: TOKEN }));
    }

    #[test]
    fn test_transfer_to_frozen_holder() {
        let mut ledger = TokenLedger::new();
        ledger.mint(TOKEN, ALICE, Amount::new(10)).unwrap();
        ledger.freeze(TOKEN, BOB);
        let result = ledger.transfer(&TOKEN, &ALICE, &BOB, Amount::new(1));
        assert_eq!(result, Err(TransferFailure::Rejected { recipient: BOB }));
        assert_eq!(ledger.balance_of(&ALICE, &TOKEN), Amount::new(10));
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let mut ledger = TokenLedger::new();
        ledger.mint(TOKEN, ALICE, Amount::new(10)).unwrap();
        ledger.transfer(&TOKEN, &ALICE, &ALICE, Amount::new(10)).unwrap();
        assert_eq!(ledger.balance_of(&ALICE, &TOKEN), Amount::new(10));
    }

    #[test]
    fn test_tokens_sorted() {
        let mut ledger = TokenLedger::new();
        let other = TokenId::new(Address::repeat(0x01));
        ledger.register(TOKEN);
        ledger.register(other);
        assert_eq!(ledger.tokens(), vec![other, TOKEN]);
    }
}
