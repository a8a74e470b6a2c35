//! Advisory fairness commitments over the plaintext seed.
//!
//! A player may publish `commit(seed)` before playing and disclose the seed
//! afterwards; anyone can then recompute the digest. Nothing on the ledger
//! checks that the committed seed is the one actually encrypted.

use core::fmt;

use sha2::{Digest, Sha256};

/// Seeds derived from entropy are reduced modulo this prime.
pub const SEED_MODULUS: u32 = 1_000_000_007;

/// 32-byte SHA-256 digest of a seed's decimal representation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommitmentDigest([u8; 32]);

impl CommitmentDigest {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Recomputes the digest from a disclosed seed and compares.
    pub fn verify(&self, disclosed_seed: u32) -> bool {
        commit(disclosed_seed) == *self
    }
}

impl fmt::Display for CommitmentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for CommitmentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitmentDigest({self})")
    }
}

/// `sha256(decimal ASCII of seed)`.
pub fn commit(seed: u32) -> CommitmentDigest {
    let digest = Sha256::digest(seed.to_string().as_bytes());
    CommitmentDigest(digest.into())
}

/// Maps arbitrary user entropy to a seed in `0..SEED_MODULUS`.
pub fn derive_seed(entropy: &[u8]) -> u32 {
    let digest = Sha256::digest(entropy);
    let word = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    word % SEED_MODULUS
}
