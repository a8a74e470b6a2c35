//! Plaintext-backed executor for unit tests.

use std::collections::HashMap;

use super::{ExecutorError, FheExecutor, InputContext};
use crate::handle::{
    CiphertextHandle, EncryptedBool, EncryptedU32, ExternalInput, HANDLE_LEN, InputProof,
    PlaintextKind,
};
use crate::identity::{Address, Scope};

#[derive(Clone, Copy, Debug)]
enum Value {
    U32(u32),
    Bool(bool),
}

impl Value {
    fn kind(&self) -> PlaintextKind {
        match self {
            Value::U32(_) => PlaintextKind::U32,
            Value::Bool(_) => PlaintextKind::Bool,
        }
    }
}

struct Entry {
    value: Value,
    verified: bool,
    acl: Vec<Address>,
}

pub(crate) struct PlainExecutor {
    scope: Scope,
    entries: HashMap<CiphertextHandle, Entry>,
    counter: u64,
    pub(crate) fail_eq: bool,
}

impl Default for PlainExecutor {
    fn default() -> Self {
        Self {
            scope: Scope::new(Address::from_bytes([0xcc; 20])),
            entries: HashMap::new(),
            counter: 0,
            fail_eq: false,
        }
    }
}

impl PlainExecutor {
    pub(crate) fn scope(&self) -> Scope {
        self.scope
    }

    fn fresh_handle(&mut self) -> CiphertextHandle {
        self.counter += 1;
        let mut bytes = [0u8; HANDLE_LEN];
        bytes[..8].copy_from_slice(&self.counter.to_be_bytes());
        bytes[HANDLE_LEN - 1] = 0xff;
        CiphertextHandle::from_bytes(bytes)
    }

    fn proof_for(handle: CiphertextHandle, context: InputContext) -> InputProof {
        let mut bytes = handle.as_bytes().to_vec();
        bytes.extend_from_slice(context.scope.address().as_bytes());
        bytes.extend_from_slice(context.signer.as_bytes());
        InputProof::from_bytes(bytes)
    }

    /// Client-side encryption of a 32-bit value bound to `context`.
    pub(crate) fn encrypt(&mut self, value: u32, context: InputContext) -> ExternalInput {
        let handle = self.fresh_handle();
        self.entries.insert(
            handle,
            Entry {
                value: Value::U32(value),
                verified: false,
                acl: Vec::new(),
            },
        );
        ExternalInput::new(handle, Self::proof_for(handle, context))
    }

    pub(crate) fn peek_u32(&self, handle: CiphertextHandle) -> Option<u32> {
        match self.entries.get(&handle)?.value {
            Value::U32(v) => Some(v),
            Value::Bool(_) => None,
        }
    }

    pub(crate) fn peek_bool(&self, handle: CiphertextHandle) -> Option<bool> {
        match self.entries.get(&handle)?.value {
            Value::Bool(v) => Some(v),
            Value::U32(_) => None,
        }
    }

    pub(crate) fn is_allowed(&self, handle: CiphertextHandle, account: Address) -> bool {
        self.entries
            .get(&handle)
            .is_some_and(|entry| entry.acl.contains(&account))
    }

    fn operand_u32(&self, handle: CiphertextHandle) -> Result<u32, ExecutorError> {
        let entry = self
            .entries
            .get(&handle)
            .ok_or(ExecutorError::UnknownHandle(handle))?;
        if !entry.verified {
            return Err(ExecutorError::NotVerified(handle));
        }
        match entry.value {
            Value::U32(v) => Ok(v),
            other => Err(ExecutorError::TypeMismatch {
                handle,
                expected: PlaintextKind::U32,
                found: other.kind(),
            }),
        }
    }

    fn store(&mut self, value: Value) -> CiphertextHandle {
        let handle = self.fresh_handle();
        self.entries.insert(
            handle,
            Entry {
                value,
                verified: true,
                acl: Vec::new(),
            },
        );
        handle
    }
}

impl FheExecutor for PlainExecutor {
    fn verify_input(
        &mut self,
        input: &ExternalInput,
        context: InputContext,
    ) -> Result<EncryptedU32, ExecutorError> {
        if Self::proof_for(input.handle, context) != input.proof || context.scope != self.scope {
            return Err(ExecutorError::InvalidProof(input.handle));
        }
        let entry = self
            .entries
            .get_mut(&input.handle)
            .ok_or(ExecutorError::UnknownHandle(input.handle))?;
        entry.verified = true;
        Ok(EncryptedU32::from_handle(input.handle))
    }

    fn rem_scalar(
        &mut self,
        lhs: EncryptedU32,
        modulus: u32,
    ) -> Result<EncryptedU32, ExecutorError> {
        if modulus == 0 {
            return Err(ExecutorError::ZeroModulus);
        }
        let value = self.operand_u32(lhs.handle())?;
        Ok(EncryptedU32::from_handle(self.store(Value::U32(value % modulus))))
    }

    fn add_scalar(&mut self, lhs: EncryptedU32, rhs: u32) -> Result<EncryptedU32, ExecutorError> {
        let value = self.operand_u32(lhs.handle())?;
        Ok(EncryptedU32::from_handle(
            self.store(Value::U32(value.wrapping_add(rhs))),
        ))
    }

    fn eq(&mut self, lhs: EncryptedU32, rhs: EncryptedU32) -> Result<EncryptedBool, ExecutorError> {
        if self.fail_eq {
            return Err(ExecutorError::Unavailable("eq disabled".into()));
        }
        let a = self.operand_u32(lhs.handle())?;
        let b = self.operand_u32(rhs.handle())?;
        Ok(EncryptedBool::from_handle(self.store(Value::Bool(a == b))))
    }

    fn allow(&mut self, handle: CiphertextHandle, account: Address) -> Result<(), ExecutorError> {
        let entry = self
            .entries
            .get_mut(&handle)
            .ok_or(ExecutorError::UnknownHandle(handle))?;
        if !entry.acl.contains(&account) {
            entry.acl.push(account);
        }
        Ok(())
    }
}
