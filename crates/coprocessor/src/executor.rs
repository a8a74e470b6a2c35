use std::collections::{HashMap, HashSet};
use std::sync::MutexGuard;

use dice_core::{
    Address, CiphertextHandle, EncryptedBool, EncryptedU32, ExecutorError, ExternalInput,
    FheExecutor, InputContext, PlaintextKind, Scope,
};
use tracing::debug;

use crate::Coprocessor;
use crate::proof::input_proof;
use crate::store::{Ciphertext, Origin, Store};

/// Evaluation context for one ledger call.
///
/// Inputs verified here are usable only within this transaction. Results and
/// grants become visible to the shared store on [`commit`](Self::commit);
/// dropping the transaction discards them.
pub struct ExecutorTransaction {
    coprocessor: Coprocessor,
    scope: Scope,
    created: HashMap<CiphertextHandle, Ciphertext>,
    verified: HashSet<CiphertextHandle>,
    grants: Vec<(CiphertextHandle, Address)>,
}

impl ExecutorTransaction {
    pub(crate) fn new(coprocessor: Coprocessor, scope: Scope) -> Self {
        Self {
            coprocessor,
            scope,
            created: HashMap::new(),
            verified: HashSet::new(),
            grants: Vec::new(),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Publish results and grants to the shared store.
    pub fn commit(self) {
        let Self {
            coprocessor,
            created,
            grants,
            ..
        } = self;
        let mut store = coprocessor.lock();
        let (new, granted) = (created.len(), grants.len());
        store.entries.extend(created);
        for (handle, account) in grants {
            if let Some(entry) = store.entries.get_mut(&handle) {
                entry.acl.insert(account);
            }
        }
        debug!(target: "coprocessor::executor", new, granted, "transaction committed");
    }

    /// Plaintext of a usable operand of the given kind.
    fn operand(
        &self,
        store: &Store,
        handle: CiphertextHandle,
        expected: PlaintextKind,
    ) -> Result<u32, ExecutorError> {
        let entry = match self.created.get(&handle) {
            Some(entry) => entry,
            None => {
                let entry = store
                    .entries
                    .get(&handle)
                    .ok_or(ExecutorError::UnknownHandle(handle))?;
                if matches!(entry.origin, Origin::Input { .. }) && !self.verified.contains(&handle)
                {
                    return Err(ExecutorError::NotVerified(handle));
                }
                entry
            }
        };
        if entry.scope != self.scope {
            return Err(ExecutorError::ScopeMismatch {
                handle,
                expected: self.scope,
                found: entry.scope,
            });
        }
        if entry.kind != expected {
            return Err(ExecutorError::TypeMismatch {
                handle,
                expected,
                found: entry.kind,
            });
        }
        Ok(entry.value)
    }

    fn emit(&mut self, store: &Store, kind: PlaintextKind, value: u32) -> CiphertextHandle {
        let mut handle = store.fresh_handle();
        while self.created.contains_key(&handle) {
            handle = store.fresh_handle();
        }
        self.created
            .insert(handle, Ciphertext::computed(kind, value, self.scope));
        handle
    }

    fn unary(
        &mut self,
        lhs: EncryptedU32,
        op: impl FnOnce(u32) -> u32,
    ) -> Result<EncryptedU32, ExecutorError> {
        let coprocessor = self.coprocessor.clone();
        let store = available(&coprocessor)?;
        let value = self.operand(&store, lhs.handle(), PlaintextKind::U32)?;
        let handle = self.emit(&store, PlaintextKind::U32, op(value));
        Ok(EncryptedU32::from_handle(handle))
    }
}

fn available(coprocessor: &Coprocessor) -> Result<MutexGuard<'_, Store>, ExecutorError> {
    let store = coprocessor.lock();
    if !store.available {
        return Err(ExecutorError::Unavailable("coprocessor offline".to_string()));
    }
    Ok(store)
}

impl FheExecutor for ExecutorTransaction {
    fn verify_input(
        &mut self,
        input: &ExternalInput,
        context: InputContext,
    ) -> Result<EncryptedU32, ExecutorError> {
        let handle = input.handle;
        let coprocessor = self.coprocessor.clone();
        let store = available(&coprocessor)?;
        if context.scope != self.scope {
            return Err(ExecutorError::ScopeMismatch {
                handle,
                expected: self.scope,
                found: context.scope,
            });
        }
        let entry = store
            .entries
            .get(&handle)
            .ok_or(ExecutorError::UnknownHandle(handle))?;
        if !matches!(entry.origin, Origin::Input { .. }) {
            return Err(ExecutorError::InvalidProof(handle));
        }
        let expected = input_proof(&coprocessor.secret, &handle, context.scope, context.signer);
        if input.proof != expected {
            return Err(ExecutorError::InvalidProof(handle));
        }
        if entry.kind != PlaintextKind::U32 {
            return Err(ExecutorError::TypeMismatch {
                handle,
                expected: PlaintextKind::U32,
                found: entry.kind,
            });
        }
        drop(store);

        self.verified.insert(handle);
        Ok(EncryptedU32::from_handle(handle))
    }

    fn rem_scalar(
        &mut self,
        lhs: EncryptedU32,
        modulus: u32,
    ) -> Result<EncryptedU32, ExecutorError> {
        if modulus == 0 {
            return Err(ExecutorError::ZeroModulus);
        }
        self.unary(lhs, |v| v % modulus)
    }

    fn add_scalar(&mut self, lhs: EncryptedU32, rhs: u32) -> Result<EncryptedU32, ExecutorError> {
        self.unary(lhs, |v| v.wrapping_add(rhs))
    }

    fn eq(&mut self, lhs: EncryptedU32, rhs: EncryptedU32) -> Result<EncryptedBool, ExecutorError> {
        let coprocessor = self.coprocessor.clone();
        let store = available(&coprocessor)?;
        let a = self.operand(&store, lhs.handle(), PlaintextKind::U32)?;
        let b = self.operand(&store, rhs.handle(), PlaintextKind::U32)?;
        let handle = self.emit(&store, PlaintextKind::Bool, u32::from(a == b));
        Ok(EncryptedBool::from_handle(handle))
    }

    fn allow(&mut self, handle: CiphertextHandle, account: Address) -> Result<(), ExecutorError> {
        let coprocessor = self.coprocessor.clone();
        let store = available(&coprocessor)?;
        if let Some(entry) = self.created.get_mut(&handle) {
            entry.acl.insert(account);
            return Ok(());
        }
        let entry = store
            .entries
            .get(&handle)
            .ok_or(ExecutorError::UnknownHandle(handle))?;
        if entry.scope != self.scope {
            return Err(ExecutorError::ScopeMismatch {
                handle,
                expected: self.scope,
                found: entry.scope,
            });
        }
        drop(store);
        self.grants.push((handle, account));
        Ok(())
    }
}
