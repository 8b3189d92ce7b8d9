//! Thread-safe handle to a vault
//!
//! Each public operation takes the lock exactly once and holds it for the
//! whole call, so concurrent callers are totally ordered and never see a
//! partially applied operation.

use parking_lot::Mutex;
use std::sync::Arc;
use types::ids::{Address, TokenId};
use types::numeric::Amount;

use crate::errors::CustodyError;
use crate::events::{CustodyEvent, EventRecord};
use crate::ledger::FungibleLedger;
use crate::native::NativeTransfer;
use crate::vault::{CustodyVault, VaultState};

/// Cloneable, `Send + Sync` handle around a [`CustodyVault`].
#[derive(Debug)]
pub struct SharedVault<N, L> {
    inner: Arc<Mutex<CustodyVault<N, L>>>,
}

impl<N, L> Clone for SharedVault<N, L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N: NativeTransfer, L: FungibleLedger> SharedVault<N, L> {
    pub fn new(vault: CustodyVault<N, L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(vault)),
        }
    }

    pub fn transfer_ownership(
        &self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<CustodyEvent, CustodyError> {
        self.inner.lock().transfer_ownership(caller, new_owner)
    }

    pub fn pause(&self, caller: &Address) -> Result<CustodyEvent, CustodyError> {
        self.inner.lock().pause(caller)
    }

    pub fn resume(&self, caller: &Address) -> Result<CustodyEvent, CustodyError> {
        self.inner.lock().resume(caller)
    }

    pub fn deposit_native(
        &self,
        sender: Address,
        amount: Amount,
    ) -> Result<CustodyEvent, CustodyError> {
        self.inner.lock().deposit_native(sender, amount)
    }

    pub fn withdraw_native(
        &self,
        caller: &Address,
        recipient: Address,
    ) -> Result<CustodyEvent, CustodyError> {
        self.inner.lock().withdraw_native(caller, recipient)
    }

    pub fn withdraw_token(
        &self,
        caller: &Address,
        token: TokenId,
        recipient: Address,
        amount: Amount,
    ) -> Result<CustodyEvent, CustodyError> {
        self.inner
            .lock()
            .withdraw_token(caller, token, recipient, amount)
    }

    pub fn token_balance(&self, token: &TokenId) -> Amount {
        self.inner.lock().token_balance(token)
    }

    pub fn native_balance(&self) -> Amount {
        self.inner.lock().native_balance()
    }

    pub fn owner(&self) -> Address {
        self.inner.lock().owner()
    }

    pub fn paused(&self) -> bool {
        self.inner.lock().paused()
    }

    pub fn snapshot(&self) -> VaultState {
        self.inner.lock().snapshot()
    }

    /// Copy of the retained event records.
    pub fn events(&self) -> Vec<EventRecord> {
        self.inner.lock().events().to_vec()
    }

    /// Run `f` with exclusive access to the vault, e.g. to touch the
    /// collaborators or to chain several calls without interleaving.
    pub fn with<R>(&self, f: impl FnOnce(&mut CustodyVault<N, L>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TokenLedger;
    use crate::native::NativeBank;
    use std::thread;

    const OWNER: Address = Address::repeat(0xaa);

    fn shared() -> SharedVault<NativeBank, TokenLedger> {
        SharedVault::new(CustodyVault::new(OWNER, NativeBank::new(), TokenLedger::new()).unwrap())
    }

    #[test]
    fn test_concurrent_deposits_all_counted() {
        let vault = shared();
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let vault = vault.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        vault
                            .deposit_native(Address::repeat(i + 1), Amount::new(1))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(vault.native_balance(), Amount::new(800));
        let sequences: Vec<u64> = vault.events().iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, (1..=800).collect::<Vec<u64>>());
    }

    #[test]
    fn test_concurrent_pause_exactly_one_wins() {
        let vault = shared();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let vault = vault.clone();
                thread::spawn(move || vault.pause(&OWNER).is_ok())
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(wins, 1);
        assert!(vault.paused());
    }

    #[test]
    fn test_concurrent_withdrawals_drain_once() {
        let vault = shared();
        vault.deposit_native(OWNER, Amount::new(50)).unwrap();
        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let vault = vault.clone();
                thread::spawn(move || vault.withdraw_native(&OWNER, Address::repeat(0x10 + i)))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == CustodyError::ZeroBalance));
        assert_eq!(vault.native_balance(), Amount::ZERO);
        let paid: u128 = (0..4u8)
            .map(|i| vault.with(|v| v.native().balance_of(&Address::repeat(0x10 + i)).value()))
            .sum();
        assert_eq!(paid, 50);
    }

    /// Native primitive that panics when paying `trap`.
    #[derive(Debug)]
    struct TrapBank {
        inner: NativeBank,
        trap: Address,
    }

    impl NativeTransfer for TrapBank {
        fn send(&mut self, to: &Address, amount: Amount) -> Result<(), crate::TransferFailure> {
            if *to == self.trap {
                panic!("native transfer to {to} aborted");
            }
            self.inner.send(to, amount)
        }
    }

    #[test]
    fn test_panicking_collaborator_leaves_handle_usable() {
        const BAD: Address = Address::repeat(0xbd);
        const GOOD: Address = Address::repeat(0x90);

        let native = TrapBank {
            inner: NativeBank::new(),
            trap: BAD,
        };
        let vault = SharedVault::new(CustodyVault::new(OWNER, native, TokenLedger::new()).unwrap());
        vault.deposit_native(OWNER, Amount::new(100)).unwrap();

        let handle = vault.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            handle.withdraw_native(&OWNER, BAD)
        }));
        assert!(result.is_err());
        assert_eq!(vault.native_balance(), Amount::new(100));
        assert_eq!(vault.events().len(), 1);

        vault.deposit_native(OWNER, Amount::new(5)).unwrap();
        let event = vault.withdraw_native(&OWNER, GOOD).unwrap();
        assert_eq!(
            event,
            CustodyEvent::NativeWithdrawal(crate::events::NativeWithdrawal {
                recipient: GOOD,
                amount: Amount::new(105),
            })
        );
        assert_eq!(vault.with(|v| v.native().inner.balance_of(&GOOD)), Amount::new(105));
    }
}
