//! Run report export
//!
//! Serializes metrics, scenario results and the final vault state to JSON
//! for external consumption.

use chrono::{DateTime, Utc};
use custody::VaultState;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engine::SimEngine;
use crate::metrics::SimMetrics;
use crate::scenarios::ScenarioResult;

/// Combined export containing all simulation outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationExport {
    pub version: String,
    pub abi_version: String,
    pub generated_at: DateTime<Utc>,
    pub seed: Option<u64>,
    pub metrics: Option<SimMetrics>,
    pub mismatches: usize,
    pub final_state: Option<VaultState>,
    pub event_count: usize,
    pub scenarios: Vec<ScenarioResult>,
}

impl SimulationExport {
    /// True when the random run matched the model and every scenario passed.
    pub fn is_clean(&self) -> bool {
        self.mismatches == 0 && self.scenarios.iter().all(|s| s.passed)
    }
}

/// Build an export from an optional random run and scenario results.
pub fn build_export(engine: Option<&SimEngine>, scenarios: Vec<ScenarioResult>) -> SimulationExport {
    SimulationExport {
        version: crate::VERSION.to_string(),
        abi_version: custody::CONTRACT_ABI_VERSION.to_string(),
        generated_at: Utc::now(),
        seed: engine.map(|e| e.config().seed),
        metrics: engine.map(|e| e.metrics().clone()),
        mismatches: engine.map_or(0, |e| e.mismatches.len()),
        final_state: engine.map(|e| e.snapshot()),
        event_count: engine.map_or(0, |e| e.vault().events().len()),
        scenarios,
    }
}

pub fn export_json(export: &SimulationExport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(export)
}

/// Write export to a file path.
pub fn write_to_file(export: &SimulationExport, path: impl AsRef<Path>) -> std::io::Result<()> {
    let json = export_json(export)?;
    std::fs::write(path, json)
}
