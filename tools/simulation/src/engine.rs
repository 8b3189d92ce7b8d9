//! Seeded operation driver for the custody vault
//!
//! Generates random operations from a fixed set of actors, applies them to
//! a real vault, and checks every outcome against a shadow model of what
//! the vault should do. Any disagreement is recorded as a mismatch.

use custody::{CustodyVault, FungibleLedger, NativeBank, TokenLedger, VaultState};
use ed25519_dalek::SigningKey;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};
use types::ids::{Address, TokenId};
use types::numeric::Amount;

use crate::config::SimConfig;
use crate::errors::SimError;
use crate::metrics::SimMetrics;

/// Seed address the simulated token ledgers are derived from.
const TOKEN_ROOT: Address = Address::repeat(0x70);

/// One operation against the vault (or, for `Mint`, against the ledger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimOp {
    Deposit {
        sender: Address,
        amount: Amount,
    },
    WithdrawNative {
        caller: Address,
        recipient: Address,
    },
    WithdrawToken {
        caller: Address,
        token: TokenId,
        recipient: Address,
        amount: Amount,
    },
    Mint {
        token: TokenId,
        amount: Amount,
    },
    Pause {
        caller: Address,
    },
    Resume {
        caller: Address,
    },
    TransferOwnership {
        caller: Address,
        new_owner: Address,
    },
}

impl SimOp {
    pub fn label(&self) -> &'static str {
        match self {
            SimOp::Deposit { .. } => "deposit",
            SimOp::WithdrawNative { .. } => "withdraw_native",
            SimOp::WithdrawToken { .. } => "withdraw_token",
            SimOp::Mint { .. } => "mint",
            SimOp::Pause { .. } => "pause",
            SimOp::Resume { .. } => "resume",
            SimOp::TransferOwnership { .. } => "transfer_ownership",
        }
    }
}

/// Result of one step: `Ok` or the error kind label.
pub type StepOutcome = Result<(), String>;

/// A recorded step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimStep {
    pub index: u64,
    pub op: SimOp,
    pub outcome: StepOutcome,
}

/// Vault and model disagreed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub index: u64,
    pub op: SimOp,
    pub expected: StepOutcome,
    pub actual: StepOutcome,
}

/// What the vault should look like after every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowModel {
    pub owner: Address,
    pub halted: bool,
    pub native: Amount,
    pub tokens: BTreeMap<TokenId, Amount>,
    pub rejecting: BTreeSet<Address>,
    pub allow_zero_owner: bool,
}

impl ShadowModel {
    fn token(&self, token: &TokenId) -> Amount {
        self.tokens.get(token).copied().unwrap_or(Amount::ZERO)
    }

    fn gate(&self, caller: &Address) -> Result<(), &'static str> {
        if caller.is_zero() || *caller != self.owner {
            return Err("unauthorized");
        }
        Ok(())
    }

    fn active(&self) -> Result<(), &'static str> {
        if self.halted {
            return Err("halted");
        }
        Ok(())
    }

    /// Predict the outcome of `op` without changing the model.
    pub fn predict(&self, op: &SimOp) -> Result<(), &'static str> {
        match op {
            SimOp::Deposit { amount, .. } => {
                self.native.checked_add(*amount).ok_or("overflow")?;
                Ok(())
            }
            SimOp::WithdrawNative { caller, recipient } => {
                self.gate(caller)?;
                self.active()?;
                if self.native.is_zero() {
                    return Err("zero_balance");
                }
                if self.rejecting.contains(recipient) {
                    return Err("transfer_rejected");
                }
                Ok(())
            }
            SimOp::WithdrawToken {
                caller,
                token,
                amount,
                ..
            } => {
                self.gate(caller)?;
                self.active()?;
                if *amount > self.token(token) {
                    return Err("insufficient_balance");
                }
                if !self.tokens.contains_key(token) {
                    return Err("transfer_rejected");
                }
                Ok(())
            }
            SimOp::Mint { .. } => Ok(()),
            SimOp::Pause { caller } => {
                self.gate(caller)?;
                if self.halted {
                    return Err("already_halted");
                }
                Ok(())
            }
            SimOp::Resume { caller } => {
                self.gate(caller)?;
                if !self.halted {
                    return Err("not_halted");
                }
                Ok(())
            }
            SimOp::TransferOwnership { caller, new_owner } => {
                self.gate(caller)?;
                if new_owner.is_zero() && !self.allow_zero_owner {
                    return Err("zero_address");
                }
                Ok(())
            }
        }
    }

    /// Apply the effects of a successful `op`.
    fn apply(&mut self, op: &SimOp) {
        match op {
            SimOp::Deposit { amount, .. } => {
                self.native = self.native.checked_add(*amount).unwrap_or(self.native);
            }
            SimOp::WithdrawNative { .. } => self.native = Amount::ZERO,
            SimOp::WithdrawToken { token, amount, .. } => {
                let remaining = self.token(token).checked_sub(*amount).unwrap_or(Amount::ZERO);
                self.tokens.insert(*token, remaining);
            }
            SimOp::Mint { token, amount } => {
                let total = self.token(token).checked_add(*amount).unwrap_or(Amount::ZERO);
                self.tokens.insert(*token, total);
            }
            SimOp::Pause { .. } => self.halted = true,
            SimOp::Resume { .. } => self.halted = false,
            SimOp::TransferOwnership { new_owner, .. } => self.owner = *new_owner,
        }
    }
}

/// Deterministic simulation engine.
pub struct SimEngine {
    vault: CustodyVault<NativeBank, TokenLedger>,
    model: ShadowModel,
    rng: ChaCha8Rng,
    actors: Vec<Address>,
    tokens: Vec<TokenId>,
    config: SimConfig,
    pub steps: Vec<SimStep>,
    pub mismatches: Vec<Mismatch>,
    metrics: SimMetrics,
}

impl SimEngine {
    /// Build the actors, the rejecting set and the vault from `config`.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let actors = actor_addresses(config.actors);
        let tokens = token_ids(config.tokens);

        let mut native = NativeBank::new();
        let mut rejecting = BTreeSet::new();
        // The deployer always accepts, otherwise no native withdrawal to self
        // could ever succeed.
        for actor in actors.iter().skip(1) {
            if rng.gen_bool(config.rejecting_ratio) {
                native.mark_rejecting(*actor);
                rejecting.insert(*actor);
            }
        }

        let deployer = actors[0];
        let vault = CustodyVault::deploy(
            deployer,
            0,
            native,
            TokenLedger::new(),
            config.custody.clone(),
        )?;

        let model = ShadowModel {
            owner: deployer,
            halted: false,
            native: Amount::ZERO,
            tokens: BTreeMap::new(),
            rejecting,
            allow_zero_owner: config.custody.allow_zero_owner,
        };

        Ok(Self {
            vault,
            model,
            rng,
            actors,
            tokens,
            config,
            steps: Vec::new(),
            mismatches: Vec::new(),
            metrics: SimMetrics::new(),
        })
    }

    /// Generate the next random operation.
    pub fn next_op(&mut self) -> SimOp {
        let caller = self.pick_caller();
        let recipient = self.pick_actor();
        let token = self.tokens[self.rng.gen_range(0..self.tokens.len())];

        match self.rng.gen_range(0..100u32) {
            0..=24 => SimOp::Deposit {
                sender: self.pick_actor(),
                amount: self.pick_amount(),
            },
            25..=39 => SimOp::WithdrawNative { caller, recipient },
            40..=59 => {
                // Occasionally overdraw on purpose
                let held = u64::try_from(self.model.token(&token).value()).unwrap_or(u64::MAX);
                let ceiling = held.saturating_add(held / 5).saturating_add(1);
                SimOp::WithdrawToken {
                    caller,
                    token,
                    recipient,
                    amount: Amount::from(self.rng.gen_range(0..=ceiling)),
                }
            }
            60..=74 => SimOp::Mint {
                token,
                amount: self.pick_amount(),
            },
            75..=84 => SimOp::Pause { caller },
            85..=94 => SimOp::Resume { caller },
            _ => {
                let new_owner = if self.rng.gen_bool(0.05) {
                    Address::ZERO
                } else {
                    self.pick_actor()
                };
                SimOp::TransferOwnership { caller, new_owner }
            }
        }
    }

    /// Apply `op` to the vault, check it against the model, and record it.
    pub fn apply(&mut self, op: SimOp) -> StepOutcome {
        let index = self.steps.len() as u64;
        let expected = self.model.predict(&op).map_err(str::to_string);
        let actual = self.execute(&op);

        if expected != actual {
            warn!(index, op = op.label(), ?expected, ?actual, "Vault diverged from model");
            self.mismatches.push(Mismatch {
                index,
                op: op.clone(),
                expected: expected.clone(),
                actual: actual.clone(),
            });
        }
        let drained = match op {
            SimOp::WithdrawNative { .. } if actual.is_ok() => self.model.native,
            _ => Amount::ZERO,
        };
        if actual.is_ok() {
            self.model.apply(&op);
        }

        self.metrics.record(&op, &actual, drained);
        debug!(index, op = op.label(), ?actual, "Step applied");
        self.steps.push(SimStep {
            index,
            op,
            outcome: actual.clone(),
        });
        actual
    }

    /// Run `n` random steps.
    pub fn run(&mut self, n: u64) {
        for _ in 0..n {
            let op = self.next_op();
            self.apply(op);
        }
    }

    /// Run the configured number of steps.
    pub fn run_configured(&mut self) {
        self.run(self.config.steps);
    }

    /// Check the vault's observable state against the model.
    pub fn state_matches_model(&self) -> bool {
        let tokens_match = self
            .model
            .tokens
            .iter()
            .all(|(token, amount)| self.vault.token_balance(token) == *amount);

        self.vault.owner() == self.model.owner
            && self.vault.paused() == self.model.halted
            && self.vault.native_balance() == self.model.native
            && tokens_match
    }

    fn execute(&mut self, op: &SimOp) -> StepOutcome {
        let result = match op {
            SimOp::Deposit { sender, amount } => {
                self.vault.deposit_native(*sender, *amount).map(drop)
            }
            SimOp::WithdrawNative { caller, recipient } => {
                self.vault.withdraw_native(caller, *recipient).map(drop)
            }
            SimOp::WithdrawToken {
                caller,
                token,
                recipient,
                amount,
            } => self
                .vault
                .withdraw_token(caller, *token, *recipient, *amount)
                .map(drop),
            SimOp::Mint { token, amount } => {
                let holder = self.vault.address();
                return self
                    .vault
                    .ledger_mut()
                    .mint(*token, holder, *amount)
                    .map_err(|e| e.to_string());
            }
            SimOp::Pause { caller } => self.vault.pause(caller).map(drop),
            SimOp::Resume { caller } => self.vault.resume(caller).map(drop),
            SimOp::TransferOwnership { caller, new_owner } => {
                self.vault.transfer_ownership(caller, *new_owner).map(drop)
            }
        };
        result.map_err(|e| e.kind().to_string())
    }

    fn pick_actor(&mut self) -> Address {
        self.actors[self.rng.gen_range(0..self.actors.len())]
    }

    fn pick_caller(&mut self) -> Address {
        if self.rng.gen_bool(self.config.owner_call_ratio) {
            self.model.owner
        } else {
            self.pick_actor()
        }
    }

    fn pick_amount(&mut self) -> Amount {
        Amount::from(self.rng.gen_range(0..=self.config.max_amount))
    }

    // ───────────────────────── Accessors ─────────────────────────

    pub fn vault(&self) -> &CustodyVault<NativeBank, TokenLedger> {
        &self.vault
    }

    pub fn model(&self) -> &ShadowModel {
        &self.model
    }

    pub fn metrics(&self) -> &SimMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn actors(&self) -> &[Address] {
        &self.actors
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    pub fn snapshot(&self) -> VaultState {
        self.vault.snapshot()
    }

    /// Ledger balance of an arbitrary holder, for reports.
    pub fn ledger_balance(&self, holder: &Address, token: &TokenId) -> Amount {
        self.vault.ledger().balance_of(holder, token)
    }
}

/// Deterministic actor addresses, each owned by an ed25519 key derived from
/// its index; index 0 is the deployer.
pub fn actor_addresses(count: usize) -> Vec<Address> {
    (0..count as u64)
        .map(|i| {
            let mut secret = [0x5e; 32];
            secret[..8].copy_from_slice(&i.to_be_bytes());
            Address::from_public_key(&SigningKey::from_bytes(&secret).verifying_key())
        })
        .collect()
}

/// Deterministic token ledger identities.
pub fn token_ids(count: usize) -> Vec<TokenId> {
    (0..count as u64)
        .map(|i| TokenId::new(Address::derive(&TOKEN_ROOT, i)))
        .collect()
}
