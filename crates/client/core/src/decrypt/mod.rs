//! Authorized user decryption.
//!
//! One request runs four steps: generate a one-time keypair, build the
//! canonical authorization message, have the identity signer sign it, and
//! submit it to the relay. The relay answers with values sealed to the
//! one-time key, which are opened locally. The keypair is owned by the
//! request future, so it is dropped on success, on error, and on
//! cancellation alike. Nothing is cached and nothing is retried.

mod keypair;
mod message;

pub use keypair::DecryptionKeypair;
pub use message::AuthorizationMessage;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dice_core::{
    Address, CiphertextHandle, DiceError, EncryptedBool, EncryptedU32, ErrorKind, PlaintextKind,
    Scope,
};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::ProtocolConfig;
use crate::crypto::{self, CryptoError};
use crate::traits::{IdentitySigner, ResolutionCapability, ResolveError, SignerError};
use crate::types::{
    ClearValue, DecryptedValues, HandleScope, SealedValue, UserDecryptRequest, ValidityWindow,
};

/// User decryption errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecryptError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error("{stage} timed out after {timeout:?}")]
    Timeout {
        stage: &'static str,
        timeout: Duration,
    },

    #[error("relay returned no value for {0}")]
    MissingValue(CiphertextHandle),

    #[error("sealed value for {handle} could not be opened: {source}")]
    Corrupt {
        handle: CiphertextHandle,
        #[source]
        source: CryptoError,
    },

    #[error("handle {handle} holds {found}, expected {expected}")]
    TypeMismatch {
        handle: CiphertextHandle,
        expected: PlaintextKind,
        found: PlaintextKind,
    },
}

impl DiceError for DecryptError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Resolve(e) => e.kind(),
            Self::Signer(e) => e.kind(),
            Self::Timeout { .. } => ErrorKind::Availability,
            Self::MissingValue(_) | Self::Corrupt { .. } | Self::TypeMismatch { .. } => {
                ErrorKind::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Resolve(e) => e.error_code(),
            Self::Signer(e) => e.error_code(),
            Self::Timeout { .. } => "DECRYPTION_TIMEOUT",
            Self::MissingValue(_) => "MISSING_VALUE",
            Self::Corrupt { .. } => "CORRUPT_VALUE",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
        }
    }
}

/// Relay-side check of a request's signature and validity window.
///
/// The signature is verified first, so a correctly signed request that is
/// outside its window reports `ExpiredAuthorization`.
pub fn verify_authorization(request: &UserDecryptRequest, now: u64) -> Result<(), ResolveError> {
    let message = AuthorizationMessage::new(&request.public_key, &request.scopes, request.window);
    let recovered = crypto::recover_signer(&message.to_bytes(), &request.signature)
        .map_err(|e| ResolveError::UnauthorizedDecryption(e.to_string()))?;
    if recovered != request.signer {
        return Err(ResolveError::UnauthorizedDecryption(format!(
            "signature recovers {recovered}, request claims {}",
            request.signer
        )));
    }
    if !request.window.contains(now) {
        return Err(ResolveError::ExpiredAuthorization {
            now,
            start: request.window.start,
            end: request.window.end(),
        });
    }
    Ok(())
}

/// Client side of the user-decryption protocol.
pub struct UserDecryptor<R, S> {
    relay: R,
    signer: S,
    clock: Arc<dyn Clock>,
    config: ProtocolConfig,
}

impl<R, S> UserDecryptor<R, S>
where
    R: ResolutionCapability,
    S: IdentitySigner,
{
    pub fn new(relay: R, signer: S) -> Self {
        Self {
            relay,
            signer,
            clock: Arc::new(SystemClock),
            config: ProtocolConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: ProtocolConfig) -> Self {
        self.config = config;
        self
    }

    pub fn identity(&self) -> Address {
        self.signer.identity()
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Default window: starts now, lasts the configured number of days.
    pub fn default_window(&self) -> ValidityWindow {
        ValidityWindow::new(self.clock.now(), self.config.duration_days)
    }

    pub async fn decrypt_u32(&self, value: EncryptedU32, scope: Scope) -> Result<u32, DecryptError> {
        let handle = value.handle();
        let values = self.decrypt(&[HandleScope::new(handle, scope)]).await?;
        expect_u32(&values, handle)
    }

    pub async fn decrypt_bool(
        &self,
        value: EncryptedBool,
        scope: Scope,
    ) -> Result<bool, DecryptError> {
        let handle = value.handle();
        let values = self.decrypt(&[HandleScope::new(handle, scope)]).await?;
        expect_bool(&values, handle)
    }

    /// Resolve a batch of handles with the default window.
    pub async fn decrypt(&self, handles: &[HandleScope]) -> Result<DecryptedValues, DecryptError> {
        self.decrypt_within(handles, self.default_window()).await
    }

    /// Resolve a batch of handles under one keypair and one signature.
    ///
    /// The scope list sent to the relay is the handles' distinct scopes in
    /// order of first appearance.
    pub async fn decrypt_within(
        &self,
        handles: &[HandleScope],
        window: ValidityWindow,
    ) -> Result<DecryptedValues, DecryptError> {
        if handles.is_empty() {
            return Ok(DecryptedValues::default());
        }
        if let Some(zero) = handles.iter().find(|h| h.handle.is_zero()) {
            return Err(ResolveError::UnknownHandle(zero.handle).into());
        }

        let mut scopes: Vec<Scope> = Vec::new();
        for entry in handles {
            if !scopes.contains(&entry.scope) {
                scopes.push(entry.scope);
            }
        }

        let keypair = DecryptionKeypair::generate();
        let message = AuthorizationMessage::new(keypair.public_key(), &scopes, window);

        debug!(
            target: "client::decrypt",
            handles = handles.len(),
            scopes = scopes.len(),
            start = window.start,
            days = window.duration_days,
            "requesting user decryption"
        );

        let signature = self
            .bounded("signing", self.signer.sign_authorization(&message))
            .await??;

        let request = UserDecryptRequest {
            handles: handles.to_vec(),
            public_key: keypair.public_key().clone(),
            signature,
            scopes,
            signer: self.signer.identity(),
            window,
        };
        let sealed = self
            .bounded("resolution", self.relay.user_decrypt(request))
            .await??;

        let values = open_all(&keypair, handles, &sealed)?;
        debug!(target: "client::decrypt", resolved = values.len(), "user decryption complete");
        Ok(values)
    }

    async fn bounded<T>(
        &self,
        stage: &'static str,
        call: impl Future<Output = T>,
    ) -> Result<T, DecryptError> {
        let timeout = self.config.request_timeout;
        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| DecryptError::Timeout { stage, timeout })
    }
}

pub(crate) fn expect_u32(
    values: &DecryptedValues,
    handle: CiphertextHandle,
) -> Result<u32, DecryptError> {
    match values.get(&handle) {
        Some(ClearValue::U32(v)) => Ok(v),
        Some(other) => Err(DecryptError::TypeMismatch {
            handle,
            expected: PlaintextKind::U32,
            found: other.kind(),
        }),
        None => Err(DecryptError::MissingValue(handle)),
    }
}

pub(crate) fn expect_bool(
    values: &DecryptedValues,
    handle: CiphertextHandle,
) -> Result<bool, DecryptError> {
    match values.get(&handle) {
        Some(ClearValue::Bool(v)) => Ok(v),
        Some(other) => Err(DecryptError::TypeMismatch {
            handle,
            expected: PlaintextKind::Bool,
            found: other.kind(),
        }),
        None => Err(DecryptError::MissingValue(handle)),
    }
}

fn open_all(
    keypair: &DecryptionKeypair,
    handles: &[HandleScope],
    sealed: &[SealedValue],
) -> Result<DecryptedValues, DecryptError> {
    let mut values = DecryptedValues::default();
    for entry in handles {
        let item = sealed
            .iter()
            .find(|s| s.handle == entry.handle)
            .ok_or(DecryptError::MissingValue(entry.handle))?;
        let value = crypto::open(item, keypair.secret()).map_err(|source| DecryptError::Corrupt {
            handle: entry.handle,
            source,
        })?;
        values.insert(entry.handle, value);
    }
    Ok(values)
}
