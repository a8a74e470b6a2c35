//! Common types for ledger and relay interactions.

use std::collections::HashMap;
use std::fmt;

use dice_core::{
    Address, CiphertextHandle, CommitmentDigest, EncryptedBool, EncryptedU32, PlaintextKind, Scope,
};
use serde::{Deserialize, Serialize};

/// Generic transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub Vec<u8>);

impl TransactionId {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// A handle together with the scope whose ACL governs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleScope {
    pub handle: CiphertextHandle,
    pub scope: Scope,
}

impl HandleScope {
    pub fn new(handle: CiphertextHandle, scope: Scope) -> Self {
        Self { handle, scope }
    }
}

/// A resolved plaintext, typed per the handle's declared kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClearValue {
    U32(u32),
    Bool(bool),
}

impl ClearValue {
    pub fn kind(&self) -> PlaintextKind {
        match self {
            ClearValue::U32(_) => PlaintextKind::U32,
            ClearValue::Bool(_) => PlaintextKind::Bool,
        }
    }

    /// Fixed-width big-endian encoding used inside sealed values.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ClearValue::U32(v) => v.to_be_bytes().to_vec(),
            ClearValue::Bool(v) => vec![u8::from(*v)],
        }
    }

    pub fn from_bytes(kind: PlaintextKind, bytes: &[u8]) -> Option<Self> {
        match (kind, bytes) {
            (PlaintextKind::U32, [a, b, c, d]) => Some(ClearValue::U32(u32::from_be_bytes([
                *a, *b, *c, *d,
            ]))),
            (PlaintextKind::Bool, [0]) => Some(ClearValue::Bool(false)),
            (PlaintextKind::Bool, [1]) => Some(ClearValue::Bool(true)),
            _ => None,
        }
    }
}

/// Mapping from each requested handle to its plaintext.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecryptedValues(HashMap<CiphertextHandle, ClearValue>);

impl DecryptedValues {
    pub fn insert(&mut self, handle: CiphertextHandle, value: ClearValue) {
        self.0.insert(handle, value);
    }

    pub fn get(&self, handle: &CiphertextHandle) -> Option<ClearValue> {
        self.0.get(handle).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Half-open validity window `[start, start + duration_days)` in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub start: u64,
    pub duration_days: u32,
}

impl ValidityWindow {
    pub const SECONDS_PER_DAY: u64 = 86_400;

    pub fn new(start: u64, duration_days: u32) -> Self {
        Self {
            start,
            duration_days,
        }
    }

    /// First second at which the window no longer applies.
    pub fn end(&self) -> u64 {
        self.start
            .saturating_add(u64::from(self.duration_days) * Self::SECONDS_PER_DAY)
    }

    pub fn contains(&self, now: u64) -> bool {
        now >= self.start && now < self.end()
    }
}

/// SEC1-encoded public half of a one-time decryption keypair.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKeyBytes(pub Vec<u8>);

impl fmt::Debug for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyBytes(0x{})", hex::encode(&self.0))
    }
}

/// Recoverable signature `r || s || v` over an authorization message.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationSignature(pub Vec<u8>);

impl AuthorizationSignature {
    pub const LEN: usize = 65;
}

impl fmt::Debug for AuthorizationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthorizationSignature({} bytes)", self.0.len())
    }
}

/// Everything the relay needs to authorize and answer a user decryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDecryptRequest {
    pub handles: Vec<HandleScope>,
    pub public_key: PublicKeyBytes,
    pub signature: AuthorizationSignature,
    pub scopes: Vec<Scope>,
    pub signer: Address,
    pub window: ValidityWindow,
}

/// A plaintext re-encrypted to the request's one-time public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedValue {
    pub handle: CiphertextHandle,
    pub kind: PlaintextKind,
    /// Relay's ephemeral ECDH public key (SEC1, compressed).
    pub ephemeral_key: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: [u8; 16],
}

/// The three encrypted handles of the latest game as read from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptedSnapshot {
    pub dice_roll: EncryptedU32,
    pub player_guess: EncryptedU32,
    pub winner_flag: EncryptedBool,
}

impl EncryptedSnapshot {
    /// True before the first play, when every handle is the zero sentinel.
    pub fn is_unset(&self) -> bool {
        self.dice_roll.is_unset() && self.player_guess.is_unset() && self.winner_flag.is_unset()
    }
}

/// Plaintext view of the latest game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReveal {
    pub dice_roll: u32,
    pub player_guess: u32,
    pub won: bool,
}

/// Transparency artifact shown after a successful play.
///
/// If the player published `commitment` before playing, a third party can
/// check it against the disclosed seed. The ledger enforces nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairnessRecord {
    pub seed: u32,
    pub guess: u32,
    pub commitment: CommitmentDigest,
    pub transaction: TransactionId,
}

impl FairnessRecord {
    pub fn verify(&self) -> bool {
        self.commitment.verify(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_half_open() {
        let window = ValidityWindow::new(1_000, 10);
        assert!(!window.contains(999));
        assert!(window.contains(1_000));
        assert!(window.contains(1_000 + 10 * 86_400 - 1));
        assert!(!window.contains(1_000 + 10 * 86_400));
    }

    #[test]
    fn window_end_saturates() {
        let window = ValidityWindow::new(u64::MAX - 5, 1);
        assert_eq!(window.end(), u64::MAX);
        assert!(window.contains(u64::MAX - 1));
    }

    #[test]
    fn clear_value_bytes_are_typed() {
        assert_eq!(
            ClearValue::from_bytes(PlaintextKind::U32, &ClearValue::U32(4).to_bytes()),
            Some(ClearValue::U32(4))
        );
        assert_eq!(
            ClearValue::from_bytes(PlaintextKind::Bool, &[1]),
            Some(ClearValue::Bool(true))
        );
        assert_eq!(ClearValue::from_bytes(PlaintextKind::Bool, &[2]), None);
        assert_eq!(ClearValue::from_bytes(PlaintextKind::U32, &[1]), None);
    }
}
