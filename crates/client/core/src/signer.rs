//! In-process identity signer backed by a secp256k1 key.

use std::fmt;

use async_trait::async_trait;
use dice_core::Address;
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

use crate::crypto::{address_of, sign_recoverable};
use crate::decrypt::AuthorizationMessage;
use crate::traits::{IdentitySigner, SignerError};
use crate::types::AuthorizationSignature;

/// Holds an identity key locally and signs whatever it is asked to.
#[derive(Clone)]
pub struct LocalSigner {
    key: SigningKey,
    address: Address,
}

impl LocalSigner {
    pub fn new(key: SigningKey) -> Self {
        let address = address_of(key.verifying_key());
        Self { key, address }
    }

    pub fn random() -> Self {
        Self::new(SigningKey::random(&mut OsRng))
    }

    /// Build from a 32-byte big-endian secret scalar.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        let key = SigningKey::from_slice(bytes)
            .map_err(|_| SignerError::Failed("invalid secret key".to_string()))?;
        Ok(Self::new(key))
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IdentitySigner for LocalSigner {
    fn identity(&self) -> Address {
        self.address
    }

    async fn sign_authorization(
        &self,
        message: &AuthorizationMessage,
    ) -> Result<AuthorizationSignature, SignerError> {
        sign_recoverable(&self.key, &message.to_bytes())
            .map_err(|e| SignerError::Failed(e.to_string()))
    }
}
