//! Hashing utilities for ledger state.
//!
//! Provides deterministic digests for logging and debugging purposes.

use dice_core::GameLedgerState;
use sha2::{Digest, Sha256};

/// Digest of the bincode encoding of `state`.
///
/// Returns the first 8 bytes as hex for compact logging.
pub fn hash_ledger_state(state: &GameLedgerState) -> Result<String, bincode::Error> {
    let bytes = bincode::serialize(state)?;
    Ok(hash_bytes(&bytes))
}

/// Short hex digest of arbitrary bytes.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..8])
}
