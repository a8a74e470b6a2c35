//! Client side of the confidential dice game.
//!
//! # Architecture
//!
//! ```text
//! DiceSession
//!   ├── EncryptionGateway  -> EncryptionCapability  (seed, guess)
//!   ├── GameLedger                                  (play, withdraw, reads)
//!   └── UserDecryptor      -> IdentitySigner        (authorization)
//!                          -> ResolutionCapability  (sealed plaintexts)
//! ```
//!
//! Every external interaction is async and bounded by the
//! [`ProtocolConfig`] request timeout. Plaintexts exist only in the caller's
//! hands: they are never logged and never cached.

pub mod clock;
pub mod config;
pub mod crypto;
pub mod decrypt;
pub mod gateway;
pub mod session;
pub mod signer;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ProtocolConfig;
pub use crypto::CryptoError;
pub use decrypt::{
    AuthorizationMessage, DecryptError, DecryptionKeypair, UserDecryptor, verify_authorization,
};
pub use gateway::EncryptionGateway;
pub use session::{DiceSession, SessionError};
pub use signer::LocalSigner;
pub use traits::{
    EncryptionCapability, EncryptionError, GameLedger, IdentitySigner, LedgerError,
    ResolutionCapability, ResolveError, SignerError,
};
pub use types::{
    AuthorizationSignature, ClearValue, DecryptedValues, EncryptedSnapshot, FairnessRecord,
    GameReveal, HandleScope, PublicKeyBytes, SealedValue, TransactionId, UserDecryptRequest,
    ValidityWindow,
};
