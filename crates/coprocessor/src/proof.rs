//! Input proofs binding a handle to `(scope, signer)`.

use dice_core::{Address, CiphertextHandle, InputProof, Scope};
use sha2::{Digest, Sha256};

const PROOF_DOMAIN: &[u8] = b"dice-input-proof/v1";

/// Keyed digest only the coprocessor can produce.
pub(crate) fn input_proof(
    secret: &[u8; 32],
    handle: &CiphertextHandle,
    scope: Scope,
    signer: Address,
) -> InputProof {
    let mut hasher = Sha256::new();
    hasher.update(PROOF_DOMAIN);
    hasher.update(secret);
    hasher.update(handle.as_bytes());
    hasher.update(scope.address().as_bytes());
    hasher.update(signer.as_bytes());
    InputProof::from_bytes(hasher.finalize().to_vec())
}
