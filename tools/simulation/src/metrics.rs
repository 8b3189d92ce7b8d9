//! Counters for simulation runs
//!
//! Tracks operations by kind, rejections by error kind, value moved, and
//! wall-clock throughput.

use crate::engine::{SimOp, StepOutcome};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use types::numeric::Amount;

/// Aggregated simulation metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimMetrics {
    pub total_ops: u64,
    pub succeeded: u64,
    pub ops_by_kind: BTreeMap<String, u64>,
    pub errors_by_kind: BTreeMap<String, u64>,
    pub native_deposited: Amount,
    pub native_withdrawn: Amount,
    pub tokens_minted: Amount,
    pub tokens_withdrawn: Amount,
    pub elapsed_ns: u64,
}

impl SimMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one step. `drained` is the amount a successful native
    /// withdrawal paid out, which the operation itself does not carry.
    pub fn record(&mut self, op: &SimOp, outcome: &StepOutcome, drained: Amount) {
        self.total_ops += 1;
        *self.ops_by_kind.entry(op.label().to_string()).or_default() += 1;

        if let Err(kind) = outcome {
            *self.errors_by_kind.entry(kind.clone()).or_default() += 1;
            return;
        }
        self.succeeded += 1;

        match op {
            SimOp::Deposit { amount, .. } => {
                self.native_deposited = saturating(self.native_deposited, *amount);
            }
            SimOp::WithdrawNative { .. } => {
                self.native_withdrawn = saturating(self.native_withdrawn, drained);
            }
            SimOp::WithdrawToken { amount, .. } => {
                self.tokens_withdrawn = saturating(self.tokens_withdrawn, *amount);
            }
            SimOp::Mint { amount, .. } => {
                self.tokens_minted = saturating(self.tokens_minted, *amount);
            }
            SimOp::Pause { .. } | SimOp::Resume { .. } | SimOp::TransferOwnership { .. } => {}
        }
    }

    pub fn set_elapsed(&mut self, ns: u64) {
        self.elapsed_ns = ns;
    }

    pub fn rejected(&self) -> u64 {
        self.total_ops - self.succeeded
    }

    /// Throughput: operations per second.
    pub fn ops_per_second(&self) -> f64 {
        if self.elapsed_ns == 0 {
            return 0.0;
        }
        self.total_ops as f64 / (self.elapsed_ns as f64 / 1_000_000_000.0)
    }

    /// Native withdrawn, in whole units with `decimals` places.
    pub fn native_withdrawn_units(&self, decimals: u32) -> Decimal {
        self.native_withdrawn
            .to_units(decimals)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn summary(&self) -> String {
        format!(
            "Ops: {} | Succeeded: {} | Rejected: {} | Native in: {} | Native out: {} | Tokens out: {} | Throughput: {:.0} ops/s",
            self.total_ops,
            self.succeeded,
            self.rejected(),
            self.native_deposited,
            self.native_withdrawn,
            self.tokens_withdrawn,
            self.ops_per_second(),
        )
    }
}

fn saturating(total: Amount, add: Amount) -> Amount {
    total.checked_add(add).unwrap_or(Amount::new(u128::MAX))
}
