//! Types library for the custody workspace
//!
//! Shared identity and amount types used by the custody core and the
//! simulation tooling.
//!
//! # Modules
//! - `ids`: Addresses and token ledger identities
//! - `numeric`: Base-unit amounts and decimal unit conversion
//! - `errors`: Parse and arithmetic error taxonomy

pub mod ids;
pub mod numeric;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::errors::*;
}
