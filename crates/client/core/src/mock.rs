//! In-memory capabilities for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dice_core::{
    Address, CiphertextHandle, EncryptedBool, EncryptedU32, ExternalInput, InputProof, Scope,
};

use crate::clock::{Clock, ManualClock};
use crate::crypto;
use crate::decrypt::verify_authorization;
use crate::traits::{
    EncryptionCapability, EncryptionError, GameLedger, LedgerError, ResolutionCapability,
    ResolveError,
};
use crate::types::{ClearValue, EncryptedSnapshot, SealedValue, TransactionId, UserDecryptRequest};

struct Entry {
    value: ClearValue,
    scope: Scope,
    acl: Vec<Address>,
}

/// Relay holding plaintexts in a map, with real signature and window checks.
#[derive(Clone)]
pub struct MockRelay {
    clock: ManualClock,
    store: Arc<Mutex<HashMap<CiphertextHandle, Entry>>>,
    requests: Arc<Mutex<Vec<UserDecryptRequest>>>,
    counter: Arc<Mutex<u8>>,
}

impl MockRelay {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            store: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            counter: Arc::new(Mutex::new(0)),
        }
    }

    pub fn insert(&self, value: ClearValue, scope: Scope, readers: &[Address]) -> CiphertextHandle {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        let handle = CiphertextHandle::from_bytes([*counter; 32]);
        let mut acl = readers.to_vec();
        acl.push(scope.address());
        self.store.lock().unwrap().insert(
            handle,
            Entry {
                value,
                scope,
                acl,
            },
        );
        handle
    }

    pub fn requests(&self) -> Vec<UserDecryptRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResolutionCapability for MockRelay {
    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<Vec<SealedValue>, ResolveError> {
        self.requests.lock().unwrap().push(request.clone());
        verify_authorization(&request, self.clock.now())?;

        let store = self.store.lock().unwrap();
        let mut sealed = Vec::new();
        for entry in &request.handles {
            let stored = store
                .get(&entry.handle)
                .ok_or(ResolveError::UnknownHandle(entry.handle))?;
            if stored.scope != entry.scope
                || !stored.acl.contains(&request.signer)
                || !stored.acl.contains(&entry.scope.address())
            {
                return Err(ResolveError::UnauthorizedDecryption(format!(
                    "{} not readable by {}",
                    entry.handle, request.signer
                )));
            }
            let value = crypto::seal(entry.handle, stored.value, &request.public_key.0)
                .map_err(|e| ResolveError::MalformedRequest(e.to_string()))?;
            sealed.push(value);
        }
        Ok(sealed)
    }
}

/// Relay that never answers.
pub struct StalledRelay;

#[async_trait]
impl ResolutionCapability for StalledRelay {
    async fn user_decrypt(
        &self,
        _request: UserDecryptRequest,
    ) -> Result<Vec<SealedValue>, ResolveError> {
        std::future::pending().await
    }
}

/// Encryptor that records plaintexts by handle; `stalled` makes it hang.
#[derive(Clone, Default)]
pub struct MockEncryptor {
    pub values: Arc<Mutex<Vec<(CiphertextHandle, u32)>>>,
    pub stalled: bool,
}

#[async_trait]
impl EncryptionCapability for MockEncryptor {
    async fn encrypt_u32(
        &self,
        value: u32,
        scope: Scope,
        signer: Address,
    ) -> Result<ExternalInput, EncryptionError> {
        if self.stalled {
            std::future::pending::<()>().await;
        }
        let mut values = self.values.lock().unwrap();
        let handle = CiphertextHandle::from_bytes([values.len() as u8 + 1; 32]);
        values.push((handle, value));
        let mut proof = scope.address().as_bytes().to_vec();
        proof.extend_from_slice(signer.as_bytes());
        Ok(ExternalInput::new(handle, InputProof::from_bytes(proof)))
    }
}

/// Ledger that accepts every play and exposes fixed handles afterwards.
#[derive(Clone)]
pub struct MockLedger {
    pub scope: Scope,
    pub owner: Address,
    pub fee: u128,
    pub plays: Arc<Mutex<Vec<(Address, ExternalInput, ExternalInput, u128)>>>,
    pub latest: Arc<Mutex<(EncryptedU32, EncryptedU32, EncryptedBool)>>,
}

impl MockLedger {
    pub fn new(scope: Scope, owner: Address, fee: u128) -> Self {
        Self {
            scope,
            owner,
            fee,
            plays: Arc::new(Mutex::new(Vec::new())),
            latest: Arc::new(Mutex::new((
                EncryptedU32::UNSET,
                EncryptedU32::UNSET,
                EncryptedBool::UNSET,
            ))),
        }
    }
}

#[async_trait]
impl GameLedger for MockLedger {
    async fn scope(&self) -> Result<Scope, LedgerError> {
        Ok(self.scope)
    }

    async fn owner(&self) -> Result<Address, LedgerError> {
        Ok(self.owner)
    }

    async fn entry_fee(&self) -> Result<u128, LedgerError> {
        Ok(self.fee)
    }

    async fn play(
        &self,
        caller: Address,
        seed: ExternalInput,
        guess: ExternalInput,
        paid_value: u128,
    ) -> Result<TransactionId, LedgerError> {
        let mut plays = self.plays.lock().unwrap();
        plays.push((caller, seed, guess, paid_value));
        Ok(TransactionId::from_bytes(vec![plays.len() as u8]))
    }

    async fn withdraw(&self, caller: Address) -> Result<TransactionId, LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Withdraw(
                dice_core::WithdrawError::OnlyOwnerCanWithdraw { caller },
            ));
        }
        Ok(TransactionId::from_bytes(vec![0xff]))
    }

    async fn last_dice_roll(&self) -> Result<EncryptedU32, LedgerError> {
        Ok(self.latest.lock().unwrap().0)
    }

    async fn player_guess(&self) -> Result<EncryptedU32, LedgerError> {
        Ok(self.latest.lock().unwrap().1)
    }

    async fn winner_status(&self) -> Result<EncryptedBool, LedgerError> {
        Ok(self.latest.lock().unwrap().2)
    }

    async fn latest_play(&self) -> Result<EncryptedSnapshot, LedgerError> {
        let (dice_roll, player_guess, winner_flag) = *self.latest.lock().unwrap();
        Ok(EncryptedSnapshot {
            dice_roll,
            player_guess,
            winner_flag,
        })
    }
}
