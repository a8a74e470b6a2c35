//! Ledger-side rules of the confidential dice game.
//!
//! `dice-core` defines the singleton ledger state, the play/withdraw state
//! machine, and the dice circuit expressed over an abstract homomorphic
//! executor. It never sees plaintext seeds, guesses, or rolls; every value it
//! manipulates is an opaque [`CiphertextHandle`] tagged with its plaintext
//! type. All state mutation flows through [`engine::GameEngine`].
pub mod arith;
pub mod commitment;
pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod identity;
pub mod state;

pub use arith::{ArithmeticEngine, ExecutorError, FheExecutor, InputContext};
pub use commitment::{CommitmentDigest, commit, derive_seed};
pub use config::GameConfig;
pub use engine::{GameEngine, InputRole, Payout, PlayError, PlayRequest, WithdrawError};
pub use error::{DiceError, ErrorKind};
pub use handle::{
    Bool, CiphertextHandle, Encrypted, EncryptedBool, EncryptedU32, ExternalInput, HANDLE_LEN,
    InputProof, PlaintextKind, PlaintextType, U32,
};
pub use identity::{ADDRESS_LEN, Address, AddressParseError, Scope};
pub use state::{GameLedgerState, LatestPlay, PlayState};
