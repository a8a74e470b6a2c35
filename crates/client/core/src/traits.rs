//! Capability traits consumed by the client.
//!
//! The client never talks to a concrete network. It is parameterised by:
//! - `EncryptionCapability`: produces ciphertext handles with input proofs
//! - `ResolutionCapability`: answers signed user-decryption requests
//! - `IdentitySigner`: the agent that controls the player's identity key
//! - `GameLedger`: the ledger-facing surface of the dice game

use async_trait::async_trait;
use dice_core::{
    Address, CiphertextHandle, DiceError, EncryptedBool, EncryptedU32, ErrorKind, ExternalInput,
    PlayError, Scope, WithdrawError,
};

use crate::decrypt::AuthorizationMessage;
use crate::types::{
    AuthorizationSignature, EncryptedSnapshot, SealedValue, TransactionId, UserDecryptRequest,
};

// ============================================================================
// Error Types
// ============================================================================

/// Encryption capability errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncryptionError {
    #[error("encryption capability unavailable: {0}")]
    EncryptionUnavailable(String),

    #[error("invalid scope {scope} for signer {signer}")]
    InvalidScope { scope: Scope, signer: Address },
}

impl DiceError for EncryptionError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::EncryptionUnavailable(_) => ErrorKind::Availability,
            Self::InvalidScope { .. } => ErrorKind::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EncryptionUnavailable(_) => "ENCRYPTION_UNAVAILABLE",
            Self::InvalidScope { .. } => "INVALID_SCOPE",
        }
    }
}

/// Resolution (relay) errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown handle {0}")]
    UnknownHandle(CiphertextHandle),

    #[error("unauthorized decryption: {0}")]
    UnauthorizedDecryption(String),

    #[error("authorization expired: now {now} outside [{start}, {end})")]
    ExpiredAuthorization { now: u64, start: u64, end: u64 },

    #[error("malformed decryption request: {0}")]
    MalformedRequest(String),

    #[error("relay unavailable: {0}")]
    Unavailable(String),
}

impl DiceError for ResolveError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownHandle(_) | Self::MalformedRequest(_) => ErrorKind::Validation,
            Self::UnauthorizedDecryption(_) | Self::ExpiredAuthorization { .. } => {
                ErrorKind::Authorization
            }
            Self::Unavailable(_) => ErrorKind::Availability,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownHandle(_) => "UNKNOWN_HANDLE",
            Self::UnauthorizedDecryption(_) => "UNAUTHORIZED_DECRYPTION",
            Self::ExpiredAuthorization { .. } => "EXPIRED_AUTHORIZATION",
            Self::MalformedRequest(_) => "MALFORMED_REQUEST",
            Self::Unavailable(_) => "RELAY_UNAVAILABLE",
        }
    }
}

/// Identity signer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    #[error("signature request rejected: {0}")]
    Rejected(String),

    #[error("signing failed: {0}")]
    Failed(String),
}

impl DiceError for SignerError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Rejected(_) => ErrorKind::Authorization,
            Self::Failed(_) => ErrorKind::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "SIGNATURE_REJECTED",
            Self::Failed(_) => "SIGNING_FAILED",
        }
    }
}

/// Ledger call errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Play(#[from] PlayError),

    #[error(transparent)]
    Withdraw(#[from] WithdrawError),

    #[error("insufficient funds: {available} available, {required} required")]
    InsufficientFunds { available: u128, required: u128 },

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

impl DiceError for LedgerError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Play(e) => e.kind(),
            Self::Withdraw(e) => e.kind(),
            Self::InsufficientFunds { .. } => ErrorKind::Validation,
            Self::Unavailable(_) => ErrorKind::Availability,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Play(e) => e.error_code(),
            Self::Withdraw(e) => e.error_code(),
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::Unavailable(_) => "LEDGER_UNAVAILABLE",
        }
    }
}

// ============================================================================
// External Capabilities
// ============================================================================

/// Produces ciphertext handles bound to `(scope, signer)`.
#[async_trait]
pub trait EncryptionCapability: Send + Sync {
    /// Encrypt a 32-bit value and return its handle with an input proof.
    async fn encrypt_u32(
        &self,
        value: u32,
        scope: Scope,
        signer: Address,
    ) -> Result<ExternalInput, EncryptionError>;
}

/// Answers user-decryption requests with values sealed to the request key.
#[async_trait]
pub trait ResolutionCapability: Send + Sync {
    /// Verify the request and return one sealed value per requested handle.
    async fn user_decrypt(&self, request: UserDecryptRequest)
    -> Result<Vec<SealedValue>, ResolveError>;
}

/// The agent controlling an identity key.
#[async_trait]
pub trait IdentitySigner: Send + Sync {
    /// Address this signer speaks for.
    fn identity(&self) -> Address;

    /// Sign the canonical bytes of an authorization message.
    async fn sign_authorization(
        &self,
        message: &AuthorizationMessage,
    ) -> Result<AuthorizationSignature, SignerError>;
}

// ============================================================================
// Ledger Surface
// ============================================================================

/// Ledger-facing operations of the dice game.
#[async_trait]
pub trait GameLedger: Send + Sync {
    /// Scope that encrypted inputs must be bound to.
    async fn scope(&self) -> Result<Scope, LedgerError>;

    async fn owner(&self) -> Result<Address, LedgerError>;

    async fn entry_fee(&self) -> Result<u128, LedgerError>;

    /// Submit a play with the given native value attached.
    async fn play(
        &self,
        caller: Address,
        seed: ExternalInput,
        guess: ExternalInput,
        paid_value: u128,
    ) -> Result<TransactionId, LedgerError>;

    async fn withdraw(&self, caller: Address) -> Result<TransactionId, LedgerError>;

    async fn last_dice_roll(&self) -> Result<EncryptedU32, LedgerError>;

    async fn player_guess(&self) -> Result<EncryptedU32, LedgerError>;

    async fn winner_status(&self) -> Result<EncryptedBool, LedgerError>;

    /// All three latest-game handles read from one ledger state, so they
    /// always belong to the same game.
    async fn latest_play(&self) -> Result<EncryptedSnapshot, LedgerError>;
}
