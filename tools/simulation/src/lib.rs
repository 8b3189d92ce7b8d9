//! Simulation & Scenario Testing Framework
//!
//! Drives the custody vault with seeded random operations checked against
//! a shadow model, and with scripted scenarios.
//!
//! # Modules
//! - `config`: Run configuration
//! - `errors`: Simulation error types
//! - `engine`: Seeded operation driver and shadow model
//! - `scenarios`: Deployment walkthrough, emergency stop, ownership handoff, rejecting recipient
//! - `metrics`: Operation and value counters
//! - `replay`: Step log and deterministic replay validation
//! - `export`: Report JSON export

pub mod config;
pub mod errors;
pub mod engine;
pub mod scenarios;
pub mod metrics;
pub mod replay;
pub mod export;

/// Crate version constant
pub const VERSION: &str = "1.0.0";
