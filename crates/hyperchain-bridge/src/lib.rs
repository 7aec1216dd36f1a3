//! # Hyperchain Bridge
//!
//! Cross-chain bridge state machine: bridges between registered chains,
//! relayer quorum approval, escrow-and-release value transfer and
//! permissioned administration.
//!
//! This crate provides:
//! - `Keeper` - the message router and handlers
//! - `Querier` - paginated read-only queries
//! - `Ledger` / `EscrowAdapter` - the escrow capability over a host bank
//! - `ChainRegistry`, `BankKeeper` - capabilities consumed from the host
//! - `Host` - an in-memory host with per-message rollback
//!
//! ## Transfer Flow
//!
//! ```text
//!   InitiateTransfer ──► escrow(sender) ──► Pending
//!                                              │
//!   ApproveTransfer × min_relayers ────────────┤
//!                                              ├──► Completed ──► release(recipient)
//!   CancelTransfer (bridge admin) ─────────────┘
//!                                              └──► Failed ─────► release(sender)
//! ```
//!
//! Every message either commits all of its writes and events or none.

pub mod bank;
pub mod context;
pub mod escrow;
pub mod events;
pub mod expected;
pub mod host;
pub mod keeper;
pub mod keys;
pub mod msgs;
pub mod permissions;
pub mod query;
mod registry;
pub mod state;
mod transfers;
pub mod types;

pub use bank::StoreBank;
pub use context::Context;
pub use escrow::{EscrowAdapter, Ledger};
pub use events::{Event, EventType};
pub use expected::{BankKeeper, ChainRegistry};
pub use host::{Host, StaticChainRegistry};
pub use keeper::Keeper;
pub use msgs::*;
pub use permissions::has_permission;
pub use query::{Page, PageRequest, PageResponse, Querier, Query};
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::escrow::{EscrowAdapter, Ledger};
    pub use crate::events::{Event, EventType};
    pub use crate::host::{Host, StaticChainRegistry};
    pub use crate::keeper::Keeper;
    pub use crate::msgs::{Msg, MsgResponse};
    pub use crate::query::{PageRequest, Querier};
    pub use crate::types::*;
    pub use hyperchain_core::prelude::*;
}
