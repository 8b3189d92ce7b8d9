//! Custody contract logic
//!
//! A single-owner custody component holding native currency and
//! fungible-token balances, with owner-gated, pausable extraction of both.
//!
//! # Modules
//! - `events`: Notifications emitted by successful operations
//! - `errors`: Contract-specific error types
//! - `security`: Owner gate, circuit breaker, reentrancy guard
//! - `native`: Native currency transfer primitive
//! - `ledger`: Fungible token ledger interface
//! - `config`: Vault configuration
//! - `vault`: The custody core
//! - `shared`: Thread-safe vault handle
//!
//! # Version
//! v0.1.0

pub mod errors;
pub mod events;
pub mod security;
pub mod native;
pub mod ledger;
pub mod config;
pub mod vault;
pub mod shared;

pub use config::CustodyConfig;
pub use errors::{CustodyError, TransferFailure};
pub use events::{CustodyEvent, EventRecord};
pub use ledger::{FungibleLedger, TokenLedger};
pub use native::{NativeBank, NativeTransfer};
pub use security::OperationalState;
pub use shared::SharedVault;
pub use vault::{CustodyVault, VaultState};

/// Contract ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
