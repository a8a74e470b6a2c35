//! secp256k1 primitives shared by client and relay.
//!
//! Identities are Ethereum-style addresses. Resolved plaintexts travel sealed
//! to a one-time public key: the relay performs ECDH with a fresh ephemeral
//! key and XORs the value with a SHA-256 keystream, appending a truncated MAC.

use dice_core::{Address, CiphertextHandle};
use k256::ecdh::{EphemeralSecret, diffie_hellman};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::types::{AuthorizationSignature, ClearValue, SealedValue};

const SEAL_KEY_DOMAIN: &[u8] = b"dice-seal/key/v1";
const SEAL_TAG_DOMAIN: &[u8] = b"dice-seal/tag/v1";

/// Crypto failures surfaced to callers as protocol errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    #[error("malformed public key")]
    MalformedPublicKey,

    #[error("malformed signature")]
    MalformedSignature,

    #[error("signature does not recover a public key")]
    Unrecoverable,

    #[error("sealed value failed authentication")]
    TagMismatch,

    #[error("sealed value too long: {0} bytes")]
    TooLong(usize),

    #[error("signing failed")]
    Signing,
}

/// `keccak256(uncompressed_pubkey[1..])[12..]`.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = Keccak256::digest(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address::from_bytes(out)
}

/// Produce a 65-byte `r || s || v` signature over `message`.
pub fn sign_recoverable(
    key: &SigningKey,
    message: &[u8],
) -> Result<AuthorizationSignature, CryptoError> {
    let (signature, recovery) = key
        .sign_recoverable(message)
        .map_err(|_| CryptoError::Signing)?;
    let mut bytes = signature.to_bytes().to_vec();
    bytes.push(recovery.to_byte());
    Ok(AuthorizationSignature(bytes))
}

/// Recover the address that produced `signature` over `message`.
pub fn recover_signer(
    message: &[u8],
    signature: &AuthorizationSignature,
) -> Result<Address, CryptoError> {
    let bytes = signature.0.as_slice();
    if bytes.len() != AuthorizationSignature::LEN {
        return Err(CryptoError::MalformedSignature);
    }
    let sig = Signature::from_slice(&bytes[..64]).map_err(|_| CryptoError::MalformedSignature)?;
    let recovery = RecoveryId::from_byte(bytes[64]).ok_or(CryptoError::MalformedSignature)?;
    let key = VerifyingKey::recover_from_msg(message, &sig, recovery)
        .map_err(|_| CryptoError::Unrecoverable)?;
    Ok(address_of(&key))
}

/// Seal `value` for the holder of `recipient`'s secret key.
pub fn seal(
    handle: CiphertextHandle,
    value: ClearValue,
    recipient: &[u8],
) -> Result<SealedValue, CryptoError> {
    let recipient =
        PublicKey::from_sec1_bytes(recipient).map_err(|_| CryptoError::MalformedPublicKey)?;
    let ephemeral = EphemeralSecret::random(&mut OsRng);
    let shared = ephemeral.diffie_hellman(&recipient);
    let key = keystream(shared.raw_secret_bytes().as_slice(), &handle);

    let plaintext = value.to_bytes();
    let ciphertext = xor(&plaintext, &key)?;
    let tag = tag(&key, &ciphertext);
    let ephemeral_key = ephemeral
        .public_key()
        .to_encoded_point(true)
        .as_bytes()
        .to_vec();

    Ok(SealedValue {
        handle,
        kind: value.kind(),
        ephemeral_key,
        ciphertext,
        tag,
    })
}

/// Open a sealed value with the one-time secret key.
pub fn open(sealed: &SealedValue, secret: &SecretKey) -> Result<ClearValue, CryptoError> {
    let ephemeral = PublicKey::from_sec1_bytes(&sealed.ephemeral_key)
        .map_err(|_| CryptoError::MalformedPublicKey)?;
    let shared = diffie_hellman(secret.to_nonzero_scalar(), ephemeral.as_affine());
    let key = keystream(shared.raw_secret_bytes().as_slice(), &sealed.handle);

    if tag(&key, &sealed.ciphertext) != sealed.tag {
        return Err(CryptoError::TagMismatch);
    }
    let plaintext = xor(&sealed.ciphertext, &key)?;
    ClearValue::from_bytes(sealed.kind, &plaintext).ok_or(CryptoError::TagMismatch)
}

fn keystream(shared: &[u8], handle: &CiphertextHandle) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(SEAL_KEY_DOMAIN);
    hasher.update(shared);
    hasher.update(handle.as_bytes());
    hasher.finalize().into()
}

fn tag(key: &[u8; 32], ciphertext: &[u8]) -> [u8; 16] {
    let mut hasher = Sha256::new();
    hasher.update(SEAL_TAG_DOMAIN);
    hasher.update(key);
    hasher.update(ciphertext);
    let digest = hasher.finalize();
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest[..16]);
    out
}

fn xor(data: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
    if data.len() > key.len() {
        return Err(CryptoError::TooLong(data.len()));
    }
    Ok(data.iter().zip(key.iter()).map(|(d, k)| d ^ k).collect())
}
