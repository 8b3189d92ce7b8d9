//! Operation log and deterministic replay validation
//!
//! Same configuration plus same operations gives the same final vault.

use custody::{
    CustodyConfig, CustodyEvent, CustodyVault, EventRecord, NativeBank, TokenLedger,
    VaultState,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use types::ids::{Address, TokenId};
use types::numeric::Amount;

use crate::config::SimConfig;
use crate::engine::{SimEngine, SimOp, SimStep};
use crate::errors::SimError;

/// Vault state plus the token balances it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub vault: VaultState,
    pub token_balances: BTreeMap<TokenId, Amount>,
    pub event_count: usize,
    pub step_count: usize,
}

/// Capture a snapshot of the engine state.
pub fn capture_snapshot(engine: &SimEngine) -> EngineSnapshot {
    let token_balances = engine
        .tokens()
        .iter()
        .map(|token| (*token, engine.vault().token_balance(token)))
        .collect();

    EngineSnapshot {
        vault: engine.snapshot(),
        token_balances,
        event_count: engine.vault().events().len(),
        step_count: engine.steps.len(),
    }
}

/// A recorded run: the configuration it was built from and every step.
///
/// The seed decides the actor set and the rejecting recipients, so a log is
/// only replayable together with its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepLog {
    pub config: SimConfig,
    pub steps: Vec<SimStep>,
}

impl StepLog {
    pub fn from_engine(engine: &SimEngine) -> Self {
        Self {
            config: engine.config().clone(),
            steps: engine.steps.clone(),
        }
    }

    pub fn ops(&self) -> Vec<SimOp> {
        self.steps.iter().map(|step| step.op.clone()).collect()
    }
}

/// Re-run a recorded log under its own configuration, failing on the
/// first step whose outcome differs from the recorded one.
pub fn replay_step_log(log: &StepLog) -> Result<EngineSnapshot, SimError> {
    let mut engine = SimEngine::new(log.config.clone())?;
    for step in &log.steps {
        let replayed = engine.apply(step.op.clone());
        if replayed != step.outcome {
            return Err(SimError::Diverged {
                index: step.index,
                recorded: step.outcome.clone(),
                replayed,
            });
        }
    }
    Ok(capture_snapshot(&engine))
}

/// Replay `ops` into a fresh engine built from `config`.
///
/// The actor set and the rejecting recipients come from the seed, so the
/// configuration must be the one the log was recorded with.
pub fn replay_and_snapshot(
    config: &SimConfig,
    ops: &[SimOp],
) -> Result<EngineSnapshot, SimError> {
    let mut engine = SimEngine::new(config.clone())?;
    for op in ops {
        engine.apply(op.clone());
    }
    Ok(capture_snapshot(&engine))
}

/// Validate replay determinism: run the recorded steps through a fresh
/// engine and compare snapshots.
pub fn validate_replay(
    config: &SimConfig,
    steps: &[SimStep],
    expected: &EngineSnapshot,
) -> Result<ReplayValidation, SimError> {
    let ops: Vec<SimOp> = steps.iter().map(|step| step.op.clone()).collect();
    let replayed = replay_and_snapshot(config, &ops)?;

    Ok(ReplayValidation {
        matches: replayed == *expected,
        original: expected.clone(),
        replayed,
    })
}

/// Result of replay validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayValidation {
    pub matches: bool,
    pub original: EngineSnapshot,
    pub replayed: EngineSnapshot,
}

/// Rebuild the native side of a vault from its own event log.
///
/// Deposits, native withdrawals, lifecycle and ownership changes are
/// re-applied to a fresh vault deployed by `deployer` at `nonce`. Token
/// withdrawals are skipped since token holdings are not part of
/// [`VaultState`]. The log must be complete: sequences start at 1 with no
/// gaps, so a log trimmed by `event_log_limit` is refused.
pub fn replay_event_log(
    deployer: Address,
    nonce: u64,
    config: &CustodyConfig,
    events: &[EventRecord],
) -> Result<VaultState, SimError> {
    for (expected, record) in (1u64..).zip(events) {
        if record.sequence != expected {
            return Err(SimError::IncompleteLog {
                expected,
                found: record.sequence,
            });
        }
    }

    let mut vault = CustodyVault::deploy(
        deployer,
        nonce,
        NativeBank::new(),
        TokenLedger::new(),
        config.clone(),
    )?;

    for record in events {
        let owner = vault.owner();
        match &record.event {
            CustodyEvent::NativeDeposit(e) => {
                vault.deposit_native(e.sender, e.amount)?;
            }
            CustodyEvent::NativeWithdrawal(e) => {
                vault.withdraw_native(&owner, e.recipient)?;
            }
            CustodyEvent::OwnershipTransferred(e) => {
                vault.transfer_ownership(&e.previous_owner, e.new_owner)?;
            }
            CustodyEvent::OperationPaused => {
                vault.pause(&owner)?;
            }
            CustodyEvent::OperationResumed => {
                vault.resume(&owner)?;
            }
            CustodyEvent::TokenWithdrawal(_) => {}
        }
    }
    Ok(vault.snapshot())
}

/// Export a step log as JSON.
pub fn export_step_log(log: &StepLog) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(log)
}

/// Import a step log from JSON.
pub fn import_step_log(json: &str) -> Result<StepLog, serde_json::Error> {
    serde_json::from_str(json)
}

/// Export the vault's event records as JSON.
pub fn export_event_log(events: &[EventRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(events)
}

/// Import vault event records from JSON.
pub fn import_event_log(json: &str) -> Result<Vec<EventRecord>, serde_json::Error> {
    serde_json::from_str(json)
}
