use std::collections::{HashMap, HashSet};

use dice_client_core::ClearValue;
use dice_core::{Address, CiphertextHandle, PlaintextKind, Scope};

/// How a ciphertext came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Produced by a client; needs proof verification before use.
    Input { signer: Address },
    /// Produced by evaluating an operation.
    Computed,
}

/// A stored ciphertext. The plaintext never leaves the coprocessor except
/// sealed to an authorized requester.
#[derive(Debug, Clone)]
pub(crate) struct Ciphertext {
    pub(crate) kind: PlaintextKind,
    pub(crate) value: u32,
    pub(crate) scope: Scope,
    pub(crate) origin: Origin,
    pub(crate) acl: HashSet<Address>,
}

impl Ciphertext {
    pub(crate) fn input(value: u32, scope: Scope, signer: Address) -> Self {
        Self {
            kind: PlaintextKind::U32,
            value,
            scope,
            origin: Origin::Input { signer },
            acl: HashSet::new(),
        }
    }

    pub(crate) fn computed(kind: PlaintextKind, value: u32, scope: Scope) -> Self {
        Self {
            kind,
            value,
            scope,
            origin: Origin::Computed,
            acl: HashSet::new(),
        }
    }

    pub(crate) fn clear_value(&self) -> ClearValue {
        match self.kind {
            PlaintextKind::U32 => ClearValue::U32(self.value),
            PlaintextKind::Bool => ClearValue::Bool(self.value != 0),
        }
    }
}

/// Shared ciphertext table.
#[derive(Debug)]
pub(crate) struct Store {
    pub(crate) entries: HashMap<CiphertextHandle, Ciphertext>,
    pub(crate) available: bool,
}

impl Store {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
            available: true,
        }
    }

    /// Fresh random non-zero handle not already in use.
    pub(crate) fn fresh_handle(&self) -> CiphertextHandle {
        loop {
            let handle = CiphertextHandle::from_bytes(rand::random());
            if !handle.is_zero() && !self.entries.contains_key(&handle) {
                return handle;
            }
        }
    }
}
