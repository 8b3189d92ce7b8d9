//! Scripted vault scenarios
//!
//! Each scenario deploys a fresh vault, drives a fixed sequence of
//! operations, and checks every outcome along the way.

pub mod deploy_walkthrough;
pub mod emergency_stop;
pub mod ownership_handoff;
pub mod rejecting_recipient;

use custody::{CustodyConfig, CustodyError, CustodyVault, NativeBank, TokenLedger};
use types::ids::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Result of a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub steps_run: u64,
    pub events_emitted: usize,
    pub passed: bool,
    pub details: String,
    pub failures: Vec<String>,
}

impl ScenarioResult {
    /// A scenario that could not get past its setup.
    pub fn failed(name: &str, reason: String) -> Self {
        warn!(scenario = name, %reason, "Scenario setup failed");
        Self {
            name: name.to_string(),
            steps_run: 0,
            events_emitted: 0,
            passed: false,
            details: String::new(),
            failures: vec![reason],
        }
    }
}

/// Run every scenario against the same configuration.
pub fn run_all(config: &CustodyConfig) -> Vec<ScenarioResult> {
    vec![
        deploy_walkthrough::run(config),
        emergency_stop::run(config),
        ownership_handoff::run(config),
        rejecting_recipient::run(config),
    ]
}

/// Vault over the in-memory collaborators.
pub type SimVault = CustodyVault<NativeBank, TokenLedger>;

/// Fresh vault owned by `owner` with empty collaborators.
pub(crate) fn deploy(owner: Address, config: &CustodyConfig) -> Result<SimVault, CustodyError> {
    CustodyVault::deploy(owner, 0, NativeBank::new(), TokenLedger::new(), config.clone())
}

/// Names accepted by [`run_named`].
pub const SCENARIO_NAMES: [&str; 4] = [
    "deploy_walkthrough",
    "emergency_stop",
    "ownership_handoff",
    "rejecting_recipient",
];

/// Run one scenario by name.
pub fn run_named(name: &str, config: &CustodyConfig) -> Option<ScenarioResult> {
    let result = match name {
        "deploy_walkthrough" => deploy_walkthrough::run(config),
        "emergency_stop" => emergency_stop::run(config),
        "ownership_handoff" => ownership_handoff::run(config),
        "rejecting_recipient" => rejecting_recipient::run(config),
        _ => return None,
    };
    Some(result)
}

/// Step counter and failure collector shared by the scenarios.
#[derive(Debug, Default)]
pub(crate) struct Checks {
    steps: u64,
    failures: Vec<String>,
}

impl Checks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn expect(&mut self, condition: bool, what: &str) {
        if !condition {
            self.failures.push(what.to_string());
        }
    }

    /// Count a step that must succeed.
    pub(crate) fn expect_ok<T, E: fmt::Display>(
        &mut self,
        result: Result<T, E>,
        what: &str,
    ) -> Option<T> {
        self.steps += 1;
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.failures.push(format!("{what}: unexpected error: {e}"));
                None
            }
        }
    }

    /// Count a step that must fail with exactly `expected`.
    pub(crate) fn expect_err<T, E: PartialEq + fmt::Debug>(
        &mut self,
        result: Result<T, E>,
        expected: E,
        what: &str,
    ) {
        self.steps += 1;
        match result {
            Ok(_) => self
                .failures
                .push(format!("{what}: succeeded, expected {expected:?}")),
            Err(e) if e == expected => {}
            Err(e) => self
                .failures
                .push(format!("{what}: got {e:?}, expected {expected:?}")),
        }
    }

    pub(crate) fn finish(
        self,
        name: &str,
        vault: &SimVault,
        details: String,
    ) -> ScenarioResult {
        let passed = self.failures.is_empty();
        if passed {
            info!(scenario = name, steps = self.steps, "Scenario passed");
        } else {
            warn!(scenario = name, failures = ?self.failures, "Scenario failed");
        }
        ScenarioResult {
            name: name.to_string(),
            steps_run: self.steps,
            events_emitted: vault.events().len(),
            passed,
            details,
            failures: self.failures,
        }
    }
}
