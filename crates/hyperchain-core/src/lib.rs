//! # Hyperchain Core
//!
//! Core primitives shared by the Hyperchain bridge module and its host tooling.
//!
//! This crate provides:
//! - `Address`, `ChainId`, `Coin` - validated identifiers crossing the host boundary
//! - `BlockHeader`, `IdGenerator` - block time and deterministic id derivation
//! - `Params` - host-managed module parameters
//! - `HyperchainError` - the module's error taxonomy
//!
//! ## Determinism
//!
//! The bridge runs inside a replicated state machine. Nothing here reads the
//! wall clock or an OS random source:
//!
//! ```text
//!   block header (height, time, hash)
//!        │
//!        ├──► timestamps (created_at, completed_at, granted_at)
//!        │
//!        └──► IdGenerator ──► bridge ids, transfer ids, target tx ids
//! ```

pub mod clock;
pub mod error;
pub mod params;
pub mod types;

pub use clock::*;
pub use error::*;
pub use params::*;
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::{BlockHeader, IdGenerator};
    pub use crate::error::{HyperchainError, LedgerError, Result};
    pub use crate::params::{FeeRate, Params};
    pub use crate::types::*;
}
