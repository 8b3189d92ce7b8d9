//! Simulation error types

use custody::errors::ConfigError;
use custody::CustodyError;
use thiserror::Error;

use crate::engine::StepOutcome;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid simulation config: {0}")]
    Config(#[from] ConfigError),

    #[error("Vault error: {0}")]
    Custody(#[from] CustodyError),

    #[error("Step {index} diverged: recorded {recorded:?}, replayed {replayed:?}")]
    Diverged {
        index: u64,
        recorded: StepOutcome,
        replayed: StepOutcome,
    },

    #[error("Event log is incomplete: expected sequence {expected}, found {found}")]
    IncompleteLog { expected: u64, found: u64 },
}
