//! Versioned JSON persistence for watchroll guild state.
//!
//! One guild = one file. Saves are atomic (temp file + rename), loads are
//! validated against [`SCHEMA_VERSION`] before the state is decoded. The
//! caller owns the transaction boundary: apply a core mutation, then
//! [`save`]; on any error, skip the save so the old state stays observable.

/// Store error types.
pub mod error;
/// Load/save implementation.
pub mod store;

/// Re-export error types.
pub use error::{StoreError, StoreResult};
/// Re-export store operations.
pub use store::{SCHEMA_VERSION, load, load_or_default, save};
