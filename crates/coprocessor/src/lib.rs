//! In-memory encrypted-computation coprocessor.
//!
//! Stands in for the external services of a confidential ledger: it issues
//! ciphertext handles with input proofs, evaluates operations for a ledger
//! scope, keeps per-handle decrypt permissions, and answers signed user
//! decryption requests. Values are stored in the clear behind opaque random
//! handles, which gives the same observable behaviour as a real FHE backend
//! without the cost.
//!
//! Ledger evaluation goes through an [`ExecutorTransaction`]: new ciphertexts
//! and permission grants stay local to it until [`ExecutorTransaction::commit`],
//! so a failed play leaves no trace.
//!
//! Input ciphertexts issued by [`EncryptionCapability::encrypt_u32`] live
//! outside any transaction and are kept for the lifetime of the instance,
//! including inputs from rejected or never-submitted plays. Nothing is ever
//! evicted from the store.
//!
//! [`EncryptionCapability::encrypt_u32`]: dice_client_core::EncryptionCapability::encrypt_u32

mod executor;
mod proof;
mod relay;
mod store;

pub use executor::ExecutorTransaction;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dice_client_core::{Clock, SystemClock};
use dice_core::{Address, CiphertextHandle, PlaintextKind, Scope};

use crate::store::Store;

/// Cloneable handle to one shared coprocessor instance.
#[derive(Clone)]
pub struct Coprocessor {
    store: Arc<Mutex<Store>>,
    secret: Arc<[u8; 32]>,
    clock: Arc<dyn Clock>,
}

impl Coprocessor {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Use `clock` to judge authorization windows.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::new())),
            secret: Arc::new(rand::random()),
            clock,
        }
    }

    /// Start evaluating on behalf of the ledger at `scope`.
    pub fn begin(&self, scope: Scope) -> ExecutorTransaction {
        ExecutorTransaction::new(self.clone(), scope)
    }

    /// Simulate an outage: every call fails with an availability error.
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Whether `account` may decrypt `handle`.
    pub fn is_allowed(&self, handle: CiphertextHandle, account: Address) -> bool {
        self.lock()
            .entries
            .get(&handle)
            .is_some_and(|entry| entry.acl.contains(&account))
    }

    pub fn kind_of(&self, handle: CiphertextHandle) -> Option<PlaintextKind> {
        self.lock().entries.get(&handle).map(|entry| entry.kind)
    }

    /// Number of stored ciphertexts.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Coprocessor {
    fn default() -> Self {
        Self::new()
    }
}
