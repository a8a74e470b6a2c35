//! Public runtime API surface.
//!
//! Types exposed to consumers of the runtime crate, kept apart from the
//! worker and builder internals.

pub mod errors;
pub mod events;
pub mod handle;

pub use errors::{Result, RuntimeError};
pub use events::LedgerEvent;
pub use handle::{LedgerHandle, LedgerInfo, PlayReceipt, WithdrawReceipt};
