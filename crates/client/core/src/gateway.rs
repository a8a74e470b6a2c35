//! Client-side encryption of play inputs.

use std::time::Duration;

use dice_core::{Address, ExternalInput, Scope};
use tracing::debug;

use crate::traits::{EncryptionCapability, EncryptionError};

/// Wraps an encryption capability with input validation and a timeout.
pub struct EncryptionGateway<E> {
    capability: E,
    timeout: Duration,
}

impl<E: EncryptionCapability> EncryptionGateway<E> {
    pub fn new(capability: E, timeout: Duration) -> Self {
        Self {
            capability,
            timeout,
        }
    }

    /// Encrypt one value for `(scope, signer)`.
    pub async fn encrypt_u32(
        &self,
        value: u32,
        scope: Scope,
        signer: Address,
    ) -> Result<ExternalInput, EncryptionError> {
        if scope.is_zero() || signer.is_zero() {
            return Err(EncryptionError::InvalidScope { scope, signer });
        }

        let input = tokio::time::timeout(
            self.timeout,
            self.capability.encrypt_u32(value, scope, signer),
        )
        .await
        .map_err(|_| {
            EncryptionError::EncryptionUnavailable(format!("timed out after {:?}", self.timeout))
        })??;

        debug!(target: "client::encrypt", handle = %input.handle, "encrypted input");
        Ok(input)
    }

    /// Encrypt seed and guess concurrently; both must succeed.
    pub async fn encrypt_play(
        &self,
        seed: u32,
        guess: u32,
        scope: Scope,
        signer: Address,
    ) -> Result<(ExternalInput, ExternalInput), EncryptionError> {
        tokio::try_join!(
            self.encrypt_u32(seed, scope, signer),
            self.encrypt_u32(guess, scope, signer),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEncryptor;
    use dice_core::{DiceError, ErrorKind};

    fn scope() -> Scope {
        Scope::new(Address::from_bytes([1; 20]))
    }

    fn player() -> Address {
        Address::from_bytes([2; 20])
    }

    #[tokio::test]
    async fn encrypts_both_inputs() {
        let encryptor = MockEncryptor::default();
        let gateway = EncryptionGateway::new(encryptor.clone(), Duration::from_secs(1));

        let (seed, guess) = gateway
            .encrypt_play(12345, 4, scope(), player())
            .await
            .unwrap();
        assert_ne!(seed.handle, guess.handle);

        let mut values: Vec<u32> = encryptor.values.lock().unwrap().iter().map(|v| v.1).collect();
        values.sort_unstable();
        assert_eq!(values, vec![4, 12345]);
    }

    #[tokio::test]
    async fn zero_scope_or_signer_is_invalid() {
        let encryptor = MockEncryptor::default();
        let gateway = EncryptionGateway::new(encryptor.clone(), Duration::from_secs(1));

        let err = gateway
            .encrypt_u32(1, Scope::new(Address::ZERO), player())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SCOPE");
        assert!(gateway.encrypt_u32(1, scope(), Address::ZERO).await.is_err());
        assert!(encryptor.values.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_capability_is_unavailable() {
        let encryptor = MockEncryptor {
            stalled: true,
            ..MockEncryptor::default()
        };
        let gateway = EncryptionGateway::new(encryptor, Duration::from_secs(3));

        let err = gateway.encrypt_u32(9, scope(), player()).await.unwrap_err();
        assert!(matches!(err, EncryptionError::EncryptionUnavailable(_)));
        assert_eq!(err.kind(), ErrorKind::Availability);
    }
}
