//! Runtime hosting one confidential dice ledger.
//!
//! The ledger state lives in a single worker task; every call reaches it
//! through a bounded command channel, so plays and withdrawals are applied
//! one at a time in arrival order. Consumers embed [`Runtime`] to deploy a
//! game and interact with it through [`LedgerHandle`], which also implements
//! the client-side [`dice_client_core::GameLedger`] surface.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`utils`] holds state digests used in logs
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod runtime;
pub mod utils;

mod workers;

pub use api::{
    LedgerEvent, LedgerHandle, LedgerInfo, PlayReceipt, Result, RuntimeError, WithdrawReceipt,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
