//! Error types for the play and withdraw transitions.

use crate::arith::ExecutorError;
use crate::error::{DiceError, ErrorKind};
use crate::identity::Address;

/// Which submitted ciphertext an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum InputRole {
    Seed,
    Guess,
}

/// Failures of [`crate::engine::GameEngine::play`]. State is unchanged in every case.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlayError {
    #[error("incorrect entry fee: expected {expected}, paid {paid}")]
    IncorrectEntryFee { expected: u128, paid: u128 },

    #[error("invalid ciphertext proof for {role}: {source}")]
    InvalidCiphertextProof {
        role: InputRole,
        #[source]
        source: ExecutorError,
    },

    #[error("encrypted evaluation failed: {0}")]
    Evaluation(#[source] ExecutorError),

    #[error("fee balance would overflow")]
    BalanceOverflow,
}

impl DiceError for PlayError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::IncorrectEntryFee { .. } | Self::InvalidCiphertextProof { .. } => {
                ErrorKind::Validation
            }
            Self::Evaluation(source) if source.is_operand_rejection() => ErrorKind::Validation,
            Self::Evaluation(source) => source.kind(),
            Self::BalanceOverflow => ErrorKind::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::IncorrectEntryFee { .. } => "INCORRECT_ENTRY_FEE",
            Self::InvalidCiphertextProof { .. } => "INVALID_CIPHERTEXT_PROOF",
            Self::Evaluation(source) if source.is_operand_rejection() => {
                "INVALID_CIPHERTEXT_PROOF"
            }
            Self::Evaluation(_) => "EVALUATION_FAILED",
            Self::BalanceOverflow => "BALANCE_OVERFLOW",
        }
    }
}

/// Failures of [`crate::engine::GameEngine::withdraw`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WithdrawError {
    #[error("only the owner can withdraw (caller {caller})")]
    OnlyOwnerCanWithdraw { caller: Address },
}

impl DiceError for WithdrawError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Authorization
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OnlyOwnerCanWithdraw { .. } => "ONLY_OWNER_CAN_WITHDRAW",
        }
    }
}
