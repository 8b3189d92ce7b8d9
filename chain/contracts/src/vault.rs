//! Vault: native and token custody for a single owner
//!
//! Implements the custody core:
//! - Owner gate on every privileged operation (checked first, always)
//! - Strict pause/resume circuit breaker gating the two extractions
//! - Native deposits from anyone, full-balance native withdrawal
//! - Partial token withdrawal against the ledger-reported holding
//! - Append-only event log
//!
//! Owned state is updated before an external transfer is attempted and
//! restored if the transfer fails or panics; events are emitted last.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use types::ids::{Address, TokenId};
use types::numeric::Amount;

use crate::config::CustodyConfig;
use crate::errors::CustodyError;
use crate::events::{
    CustodyEvent, EventRecord, NativeDeposit, NativeWithdrawal, OwnershipTransferred,
    TokenWithdrawal,
};
use crate::ledger::FungibleLedger;
use crate::native::NativeTransfer;
use crate::security::{
    AccessControl, ExtractionScope, OperationalState, PauseGuard, ReentrancyGuard,
};

/// Durable state of a vault. Token holdings live in the ledger and are not
/// part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultState {
    pub address: Address,
    pub owner: Address,
    pub state: OperationalState,
    pub native_balance: Amount,
}

/// Core custody contract.
///
/// Every operation takes `&mut self`, so a call runs to completion before
/// the next one starts and never observes another call half-way through.
/// See [`crate::shared::SharedVault`] for use across threads.
///
/// Privileged operations check, in order:
/// 1. Access control (caller is the owner)
/// 2. Pause state (extractions only)
/// 3. Balance preconditions
#[derive(Debug)]
pub struct CustodyVault<N, L> {
    /// Address of the vault itself, used as the token holder
    address: Address,
    access_control: AccessControl,
    pause_guard: PauseGuard,
    reentrancy_guard: ReentrancyGuard,
    native_balance: Amount,
    native: N,
    ledger: L,
    config: CustodyConfig,
    /// Emitted events log (append-only)
    events: Vec<EventRecord>,
    next_sequence: u64,
}

impl<N: NativeTransfer, L: FungibleLedger> CustodyVault<N, L> {
    /// Deploy a vault owned by `deployer` with the default configuration.
    pub fn new(deployer: Address, native: N, ledger: L) -> Result<Self, CustodyError> {
        Self::deploy(deployer, 0, native, ledger, CustodyConfig::default())
    }

    /// Deploy a vault owned by `deployer`.
    ///
    /// The vault's own address is derived from `(deployer, nonce)`.
    pub fn deploy(
        deployer: Address,
        nonce: u64,
        native: N,
        ledger: L,
        config: CustodyConfig,
    ) -> Result<Self, CustodyError> {
        let state = VaultState {
            address: Address::derive(&deployer, nonce),
            owner: deployer,
            state: OperationalState::Active,
            native_balance: Amount::ZERO,
        };
        let vault = Self::restore(state, native, ledger, config)?;
        info!(owner = %deployer, address = %vault.address, "Custody vault deployed");
        Ok(vault)
    }

    /// Rebuild a vault from a persisted [`VaultState`].
    ///
    /// The event log starts empty.
    pub fn restore(
        state: VaultState,
        native: N,
        ledger: L,
        config: CustodyConfig,
    ) -> Result<Self, CustodyError> {
        if state.owner.is_zero() && !config.allow_zero_owner {
            return Err(CustodyError::ZeroAddress);
        }
        Ok(Self {
            address: state.address,
            access_control: AccessControl::new(state.owner),
            pause_guard: PauseGuard::with_state(state.state),
            reentrancy_guard: ReentrancyGuard::new(),
            native_balance: state.native_balance,
            native,
            ledger,
            config,
            events: Vec::new(),
            next_sequence: 1,
        })
    }

    /// Capture the durable state.
    pub fn snapshot(&self) -> VaultState {
        VaultState {
            address: self.address,
            owner: *self.access_control.owner(),
            state: self.pause_guard.state(),
            native_balance: self.native_balance,
        }
    }

    // ───────────────────────── Ownership ─────────────────────────

    /// Hand the owner role to `new_owner`. Allowed while halted.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<CustodyEvent, CustodyError> {
        self.authorize(caller, "transfer_ownership")?;

        let previous_owner = self
            .access_control
            .transfer_owner(caller, new_owner, self.config.allow_zero_owner)
            .inspect_err(|err| warn!(%caller, %new_owner, error = %err, "Ownership transfer refused"))?;

        info!(%previous_owner, %new_owner, "Ownership transferred");
        Ok(self.emit(CustodyEvent::OwnershipTransferred(OwnershipTransferred {
            previous_owner,
            new_owner,
        })))
    }

    /// Current owner.
    pub fn owner(&self) -> Address {
        *self.access_control.owner()
    }

    // ───────────────────────── Pause ─────────────────────────

    /// Halt extractions. Owner-only; fails if already halted.
    pub fn pause(&mut self, caller: &Address) -> Result<CustodyEvent, CustodyError> {
        self.authorize(caller, "pause")?;
        self.pause_guard.pause()?;
        info!(%caller, "Operation paused");
        Ok(self.emit(CustodyEvent::OperationPaused))
    }

    /// Re-enable extractions. Owner-only; fails unless halted.
    pub fn resume(&mut self, caller: &Address) -> Result<CustodyEvent, CustodyError> {
        self.authorize(caller, "resume")?;
        self.pause_guard.resume()?;
        info!(%caller, "Operation resumed");
        Ok(self.emit(CustodyEvent::OperationResumed))
    }

    /// Check if the vault is halted.
    pub fn paused(&self) -> bool {
        self.pause_guard.is_paused()
    }

    pub fn state(&self) -> OperationalState {
        self.pause_guard.state()
    }

    // ───────────────────────── Native Currency ─────────────────────────

    /// Accept native currency from any sender, in any state.
    pub fn deposit_native(
        &mut self,
        sender: Address,
        amount: Amount,
    ) -> Result<CustodyEvent, CustodyError> {
        self.native_balance = self
            .native_balance
            .checked_add(amount)
            .ok_or(CustodyError::Overflow)?;

        debug!(
            %sender,
            %amount,
            balance = %self.native_balance,
            "Native deposit received"
        );
        Ok(self.emit(CustodyEvent::NativeDeposit(NativeDeposit { sender, amount })))
    }

    /// Send the entire native balance to `recipient`.
    ///
    /// The balance is zeroed before the transfer primitive is called and
    /// restored if it reports failure or unwinds.
    pub fn withdraw_native(
        &mut self,
        caller: &Address,
        recipient: Address,
    ) -> Result<CustodyEvent, CustodyError> {
        self.authorize(caller, "withdraw_native")?;
        self.pause_guard.ensure_active()?;
        if self.native_balance.is_zero() {
            return Err(CustodyError::ZeroBalance);
        }

        let sent = {
            let mut scope = ExtractionScope::enter(&mut self.reentrancy_guard)?;
            let amount = scope.take(&mut self.native_balance);
            match self.native.send(&recipient, amount) {
                Ok(()) => {
                    scope.commit();
                    Ok(amount)
                }
                Err(reason) => Err((amount, reason)),
            }
        };
        let amount = match sent {
            Ok(amount) => amount,
            Err((amount, reason)) => {
                warn!(%recipient, %amount, %reason, "Native transfer rejected");
                return Err(reason.into());
            }
        };

        info!(
            %recipient,
            %amount,
            units = ?amount.to_units(self.config.native_decimals).ok(),
            "Native balance withdrawn"
        );
        Ok(self.emit(CustodyEvent::NativeWithdrawal(NativeWithdrawal {
            recipient,
            amount,
        })))
    }

    /// Native balance held by the vault.
    pub fn native_balance(&self) -> Amount {
        self.native_balance
    }

    // ───────────────────────── Tokens ─────────────────────────

    /// Ledger-reported balance of the vault for `token`. Works while halted.
    pub fn token_balance(&self, token: &TokenId) -> Amount {
        self.ledger.balance_of(&self.address, token)
    }

    /// Send `amount` of `token` to `recipient`. Partial withdrawals allowed.
    pub fn withdraw_token(
        &mut self,
        caller: &Address,
        token: TokenId,
        recipient: Address,
        amount: Amount,
    ) -> Result<CustodyEvent, CustodyError> {
        self.authorize(caller, "withdraw_token")?;
        self.pause_guard.ensure_active()?;

        let available = self.token_balance(&token);
        if amount > available {
            return Err(CustodyError::InsufficientBalance {
                token,
                available,
                requested: amount,
            });
        }

        let moved = {
            let scope = ExtractionScope::enter(&mut self.reentrancy_guard)?;
            let moved = self
                .ledger
                .transfer(&token, &self.address, &recipient, amount);
            if moved.is_ok() {
                scope.commit();
            }
            moved
        };

        if let Err(reason) = moved {
            warn!(%token, %recipient, %amount, %reason, "Token transfer rejected");
            return Err(reason.into());
        }

        info!(%token, %recipient, %amount, "Token withdrawn");
        Ok(self.emit(CustodyEvent::TokenWithdrawal(TokenWithdrawal {
            token,
            recipient,
            amount,
        })))
    }

    // ───────────────────────── Accessors ─────────────────────────

    /// Address of the vault itself.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &CustodyConfig {
        &self.config
    }

    /// The native transfer collaborator.
    pub fn native(&self) -> &N {
        &self.native
    }

    /// Mutable access to the outside world's native accounting (funding
    /// senders, marking rejecting recipients). Does not touch vault state.
    pub fn native_mut(&mut self) -> &mut N {
        &mut self.native
    }

    /// The token ledger collaborator.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable access to the ledger, e.g. to mint tokens to the vault.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all retained event records.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn last_event(&self) -> Option<&EventRecord> {
        self.events.last()
    }

    /// Drain all events (consume and clear). Sequence numbers keep counting.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Internal Guards ─────────────────────────

    fn authorize(&self, caller: &Address, operation: &'static str) -> Result<(), CustodyError> {
        self.access_control
            .ensure_owner(caller)
            .inspect_err(|_| warn!(%caller, operation, "Unauthorized call rejected"))
    }

    fn emit(&mut self, event: CustodyEvent) -> CustodyEvent {
        let record = EventRecord::new(self.next_sequence, event.clone());
        self.next_sequence += 1;
        self.events.push(record);

        if let Some(limit) = self.config.event_log_limit {
            if self.events.len() > limit {
                let excess = self.events.len() - limit;
                self.events.drain(..excess);
            }
        }
        event
    }
}
