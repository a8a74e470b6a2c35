//! Background workers owned by the runtime.

mod accounts;
mod ledger;

pub(crate) use accounts::NativeAccounts;
pub use ledger::{Command, LedgerWorker};
