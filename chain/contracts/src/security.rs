//! Shared security primitives for the custody core
//!
//! Provides the owner gate, the circuit breaker, and the reentrancy guard
//! that every value-moving operation passes through.

use serde::{Deserialize, Serialize};
use types::ids::Address;
use types::numeric::Amount;

use crate::errors::CustodyError;

/// Reentrancy guard preventing nested calls into protected functions.
///
/// A contract function acquires the guard before executing state-changing
/// logic and releases it on completion. Any nested call attempt fails.
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    locked: bool,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self { locked: false }
    }

    /// Acquire the guard. Returns `true` if successfully acquired.
    /// Returns `false` if already locked (reentrancy attempt).
    pub fn acquire(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    /// Release the guard.
    pub fn release(&mut self) {
        self.locked = false;
    }

    /// Check if currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// Scope held across an external transfer call.
///
/// Holds the reentrancy guard for its lifetime. On drop it releases the
/// guard and, unless [`commit`](Self::commit) was called, puts back any
/// balance taken with [`take`](Self::take). Drop also runs while unwinding,
/// so a panicking collaborator leaves the vault as it was before the call.
#[derive(Debug)]
pub struct ExtractionScope<'a> {
    guard: &'a mut ReentrancyGuard,
    held: Option<(&'a mut Amount, Amount)>,
    committed: bool,
}

impl<'a> ExtractionScope<'a> {
    /// Acquire `guard`, failing with `Reentrancy` if it is already held.
    pub fn enter(guard: &'a mut ReentrancyGuard) -> Result<Self, CustodyError> {
        if !guard.acquire() {
            return Err(CustodyError::Reentrancy);
        }
        Ok(Self {
            guard,
            held: None,
            committed: false,
        })
    }

    /// Zero `balance` and return what it held; restored on rollback.
    pub fn take(&mut self, balance: &'a mut Amount) -> Amount {
        let amount = std::mem::replace(balance, Amount::ZERO);
        self.held = Some((balance, amount));
        amount
    }

    /// Keep the effects and release the guard.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for ExtractionScope<'_> {
    fn drop(&mut self) {
        if !self.committed {
            if let Some((balance, amount)) = self.held.take() {
                *balance = amount;
            }
        }
        self.guard.release();
    }
}

/// Single-principal access control.
///
/// Exactly one owner exists at any time. Only the owner can hand the role
/// over.
#[derive(Debug, Clone)]
pub struct AccessControl {
    owner: Address,
}

impl AccessControl {
    /// Create access control with an initial owner.
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    /// The zero address never passes, so a renounced vault stays locked.
    pub fn is_owner(&self, caller: &Address) -> bool {
        !caller.is_zero() && self.owner == *caller
    }

    /// Fail with `Unauthorized` unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: &Address) -> Result<(), CustodyError> {
        if !self.is_owner(caller) {
            return Err(CustodyError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Transfer ownership. Returns the previous owner.
    ///
    /// The zero address is refused unless `allow_zero` is set; an owner of
    /// zero can never call again, so every privileged operation would be
    /// locked forever.
    pub fn transfer_owner(
        &mut self,
        caller: &Address,
        new_owner: Address,
        allow_zero: bool,
    ) -> Result<Address, CustodyError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() && !allow_zero {
            return Err(CustodyError::ZeroAddress);
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }

    /// Get the current owner.
    pub fn owner(&self) -> &Address {
        &self.owner
    }
}

/// Circuit-breaker mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperationalState {
    #[default]
    Active,
    Halted,
}

/// Strict pause modifier: each transition requires the opposite state.
#[derive(Debug, Clone, Default)]
pub struct PauseGuard {
    state: OperationalState,
}

impl PauseGuard {
    /// Create a new guard in the `Active` state.
    pub fn new() -> Self {
        Self {
            state: OperationalState::Active,
        }
    }

    pub(crate) fn with_state(state: OperationalState) -> Self {
        Self { state }
    }

    /// Active -> Halted. Pausing twice is an error, not a no-op.
    pub fn pause(&mut self) -> Result<(), CustodyError> {
        if self.state == OperationalState::Halted {
            return Err(CustodyError::AlreadyHalted);
        }
        self.state = OperationalState::Halted;
        Ok(())
    }

    /// Halted -> Active.
    pub fn resume(&mut self) -> Result<(), CustodyError> {
        if self.state == OperationalState::Active {
            return Err(CustodyError::NotHalted);
        }
        self.state = OperationalState::Active;
        Ok(())
    }

    pub fn ensure_active(&self) -> Result<(), CustodyError> {
        if self.is_paused() {
            return Err(CustodyError::Halted);
        }
        Ok(())
    }

    /// Check if currently paused.
    pub fn is_paused(&self) -> bool {
        self.state == OperationalState::Halted
    }

    pub fn state(&self) -> OperationalState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Address = Address::repeat(0xaa);
    const OTHER: Address = Address::repeat(0xbb);

    // --- ReentrancyGuard tests ---

    #[test]
    fn test_reentrancy_guard_acquire_release() {
        let mut guard = ReentrancyGuard::new();
        assert!(!guard.is_locked());
        assert!(guard.acquire());
        assert!(guard.is_locked());
        guard.release();
        assert!(!guard.is_locked());
    }

    #[test]
    fn test_reentrancy_guard_double_acquire_fails() {
        let mut guard = ReentrancyGuard::new();
        assert!(guard.acquire());
        assert!(!guard.acquire(), "Second acquire must fail");
    }

    // --- ExtractionScope tests ---

    #[test]
    fn test_extraction_scope_rolls_back_on_drop() {
        let mut guard = ReentrancyGuard::new();
        let mut balance = Amount::new(40);
        {
            let mut scope = ExtractionScope::enter(&mut guard).unwrap();
            assert_eq!(scope.take(&mut balance), Amount::new(40));
        }
        assert_eq!(balance, Amount::new(40));
        assert!(!guard.is_locked());
    }

    #[test]
    fn test_extraction_scope_commit_keeps_effects() {
        let mut guard = ReentrancyGuard::new();
        let mut balance = Amount::new(40);
        let mut scope = ExtractionScope::enter(&mut guard).unwrap();
        scope.take(&mut balance);
        scope.commit();
        assert_eq!(balance, Amount::ZERO);
        assert!(!guard.is_locked());
    }

    #[test]
    fn test_extraction_scope_rejects_nested_entry() {
        let mut guard = ReentrancyGuard::new();
        guard.acquire();
        assert!(matches!(
            ExtractionScope::enter(&mut guard),
            Err(CustodyError::Reentrancy)
        ));
        // A refused entry must not release the outer holder's guard.
        assert!(guard.is_locked());
    }

    #[test]
    fn test_extraction_scope_restores_during_unwind() {
        let mut guard = ReentrancyGuard::new();
        let mut balance = Amount::new(9);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut scope = ExtractionScope::enter(&mut guard).unwrap();
            scope.take(&mut balance);
            panic!("transfer primitive blew up");
        }));
        assert!(result.is_err());
        assert_eq!(balance, Amount::new(9));
        assert!(!guard.is_locked());
    }

    // --- AccessControl tests ---

    #[test]
    fn test_access_control_owner() {
        let ac = AccessControl::new(OWNER);
        assert!(ac.is_owner(&OWNER));
        assert!(!ac.is_owner(&OTHER));
        assert_eq!(
            ac.ensure_owner(&OTHER),
            Err(CustodyError::Unauthorized { caller: OTHER })
        );
    }

    #[test]
    fn test_access_control_transfer() {
        let mut ac = AccessControl::new(OWNER);
        let previous = ac.transfer_owner(&OWNER, OTHER, false).unwrap();
        assert_eq!(previous, OWNER);
        assert_eq!(ac.owner(), &OTHER);
        assert!(!ac.is_owner(&OWNER));
    }

    #[test]
    fn test_access_control_non_owner_cannot_transfer() {
        let mut ac = AccessControl::new(OWNER);
        let result = ac.transfer_owner(&OTHER, OTHER, false);
        assert_eq!(result, Err(CustodyError::Unauthorized { caller: OTHER }));
        assert_eq!(ac.owner(), &OWNER);
    }

    #[test]
    fn test_access_control_zero_owner_policy() {
        let mut ac = AccessControl::new(OWNER);
        assert_eq!(
            ac.transfer_owner(&OWNER, Address::ZERO, false),
            Err(CustodyError::ZeroAddress)
        );
        assert_eq!(ac.owner(), &OWNER);

        ac.transfer_owner(&OWNER, Address::ZERO, true).unwrap();
        assert!(ac.owner().is_zero());
        assert!(!ac.is_owner(&Address::ZERO));
        assert!(!ac.is_owner(&OWNER));
    }

    #[test]
    fn test_access_control_self_transfer_allowed() {
        let mut ac = AccessControl::new(OWNER);
        assert_eq!(ac.transfer_owner(&OWNER, OWNER, false), Ok(OWNER));
        assert_eq!(ac.owner(), &OWNER);
    }

    // --- PauseGuard tests ---

    #[test]
    fn test_pause_guard_cycle() {
        let mut pg = PauseGuard::new();
        assert!(!pg.is_paused());
        pg.pause().unwrap();
        assert!(pg.is_paused());
        assert_eq!(pg.ensure_active(), Err(CustodyError::Halted));
        pg.resume().unwrap();
        assert!(!pg.is_paused());
        assert!(pg.ensure_active().is_ok());
    }

    #[test]
    fn test_pause_guard_rejects_no_op_transitions() {
        let mut pg = PauseGuard::new();
        assert_eq!(pg.resume(), Err(CustodyError::NotHalted));
        pg.pause().unwrap();
        assert_eq!(pg.pause(), Err(CustodyError::AlreadyHalted));
        assert_eq!(pg.state(), OperationalState::Halted);
    }
}
